mod buffered_file;
mod file;
mod handle;
mod registry;
mod stdio;

pub use self::{
    buffered_file::BufferedFile,
    file::File,
    handle::FileHandle,
    registry::{FileRegistry, SweepStats},
    stdio::{
        DefaultStderr, DefaultStdin, DefaultStdout, SystemStderr, SystemStdin, SystemStdout,
        UnavailableStderr, UnavailableStdin, UnavailableStdout,
    },
};
