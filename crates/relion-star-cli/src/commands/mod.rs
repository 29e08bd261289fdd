pub mod defocus_groups;
pub mod export;
pub mod filter;
pub mod info;
pub mod join_optics;
pub mod reformat;
pub mod show;
pub mod sort;

#[cfg(test)]
pub(crate) mod test_support;
