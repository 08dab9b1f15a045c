mod kernel;

pub use kernel::Kernel;
