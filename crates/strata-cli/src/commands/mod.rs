/// `strata generate`: run a batch and write graph files.
pub mod generate;
/// `strata inspect`: decode and summarise a graph file.
pub mod inspect;
