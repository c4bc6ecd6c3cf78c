pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no {kind} adapter found")]
    NoAdapter { kind: String },

    #[error("failed to request device: {0}")]
    RequestDevice(String),

    #[error("{call} failed: {message}")]
    Gpu { call: &'static str, message: String },

    #[error("kernel `{kernel}` failed to build:\n{log}")]
    KernelBuild { kernel: &'static str, log: String },

    #[error("{what} needs {requested} but the device allows {limit}")]
    Capacity {
        what: &'static str,
        requested: u64,
        limit: u64,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("result mismatch at index {index}: expected {expected}, got {actual}")]
    Verify {
        index: usize,
        expected: f32,
        actual: f32,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn gpu<S: Into<String>>(call: &'static str, msg: S) -> Self {
        Error::Gpu {
            call,
            message: msg.into(),
        }
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Process exit status for this error. Never zero.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::NoAdapter { .. } => 2,
            Error::RequestDevice(_) => 3,
            Error::Gpu { .. } => 4,
            Error::KernelBuild { .. } => 5,
            Error::Capacity { .. } => 6,
            Error::Config(_) => 7,
            Error::Verify { .. } => 8,
            Error::Io(_) => 9,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_nonzero_and_distinct() {
        let errors = [
            Error::NoAdapter { kind: "GPU".into() },
            Error::RequestDevice("lost".into()),
            Error::gpu("map_async", "device lost"),
            Error::KernelBuild {
                kernel: "vector_add",
                log: "bad token".into(),
            },
            Error::Capacity {
                what: "storage binding",
                requested: 10,
                limit: 5,
            },
            Error::config("bad"),
            Error::Verify {
                index: 0,
                expected: 1.0,
                actual: 2.0,
            },
            Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk")),
        ];

        let mut codes: Vec<i32> = errors.iter().map(Error::exit_code).collect();
        assert!(codes.iter().all(|&c| c != 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_gpu_error_names_the_call() {
        let err = Error::gpu("create_buffer", "out of memory");
        assert_eq!(err.to_string(), "create_buffer failed: out of memory");
    }
}
