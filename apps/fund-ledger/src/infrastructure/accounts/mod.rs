//! Account Directory Adapters

mod static_directory;

pub use static_directory::StaticAccountDirectory;
