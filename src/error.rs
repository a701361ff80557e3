// Error taxonomy for a share run. Every failure is terminal: the binary
// prints the `Display` text to stderr and exits with `exit_code()`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShareError {
    #[error(
        "Config file does not exist. Please create {} and put something like this in there:\n\n[S3]\nbucket_name = name-of-the-target-bucket",
        .path.display()
    )]
    ConfigMissing { path: PathBuf },

    #[error("Could not determine the home directory. Set {} to the path of the config file.", crate::config::CONFIG_ENV)]
    NoHomeDir,

    #[error("Could not read config file {}: {source}", .path.display())]
    ConfigUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file is missing \"bucket_name\" option in \"[S3]\" section.")]
    ConfigIncomplete,

    #[error("File does not exist: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Could not read {}: {source}", .path.display())]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Bucket does not exist: {0}")]
    BucketNotFound(String),

    #[error("Missing or invalid AWS credentials.")]
    CredentialsInvalid,

    #[error("Error while connecting to S3. {status} {message}")]
    StorageService { status: u16, message: String },

    #[error("Error while connecting to S3. {0}")]
    StorageTransport(#[from] ::s3::error::S3Error),

    #[error("Could not set up the S3 client: {0}")]
    ClientSetup(String),

    #[error("File \"{0}\" already exists. Use --overwrite if you want to upload anyway.")]
    ObjectAlreadyExists(String),
}

impl ShareError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            ShareError::ConfigMissing { .. }
            | ShareError::NoHomeDir
            | ShareError::ConfigUnreadable { .. } => 1,
            ShareError::ConfigIncomplete => 2,
            ShareError::FileNotFound(_) | ShareError::LocalIo { .. } => 3,
            ShareError::BucketNotFound(_)
            | ShareError::CredentialsInvalid
            | ShareError::StorageService { .. }
            | ShareError::StorageTransport(_)
            | ShareError::ClientSetup(_) => 4,
            ShareError::ObjectAlreadyExists(_) => 5,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShareError>;
