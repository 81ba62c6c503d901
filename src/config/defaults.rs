//! Default configuration values

/// Directory where generated images are written unless overridden
pub const GENERATED_IMAGE_DIR: &str = "generated-images";

/// Directory where remote inputs are cached unless overridden
pub const TMP_DIR: &str = "tmp";

/// Default output image format
pub const DEFAULT_IMAGE_FORMAT: &str = "qcow2";

/// Default read buffer size for checksum computation (64 KiB)
pub const DEFAULT_BUFFER_SIZE: usize = 65536;

/// Compatibility options applied to qcow2 outputs after generation
pub const QCOW2_COMPAT_OPTIONS: &str = "compat=v3";

/// Image formats qemu-img can run a consistency check against
pub const CONSISTENCY_SUPPORTED_FORMATS: &[&str] = &["qcow2", "qed", "parallels", "vhdx", "vdi"];
