pub mod lump_sum;
