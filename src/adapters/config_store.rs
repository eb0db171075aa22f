//! Configuration storage adapters.
//!
//! Both implement [`ConfigPort`] and persist [`RoverConfig`] as a postcard
//! blob:
//!
//! - [`MemoryConfigStore`] keeps the blob in RAM (host, tests, and the
//!   firmware fallback when flash is unavailable).
//! - [`NvsConfigStore`] (ESP-IDF only) keeps it in the default NVS
//!   partition.
//!
//! Every save validates first; an invalid config never reaches storage.

use log::info;

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::RoverConfig;

/// Upper bound on a stored blob.  The encoded config is well under this.
pub const MAX_BLOB_SIZE: usize = 512;

fn decode(bytes: &[u8]) -> Result<RoverConfig, ConfigError> {
    let cfg: RoverConfig = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
    cfg.validate()?;
    Ok(cfg)
}

fn encode(config: &RoverConfig) -> Result<Vec<u8>, ConfigError> {
    config.validate()?;
    let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
    if bytes.len() > MAX_BLOB_SIZE {
        return Err(ConfigError::IoError);
    }
    Ok(bytes)
}

// ── In-memory store ──────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    blob: Option<Vec<u8>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with raw bytes (e.g. a blob read from elsewhere).
    pub fn with_blob(blob: Vec<u8>) -> Self {
        Self { blob: Some(blob) }
    }

    pub fn blob(&self) -> Option<&[u8]> {
        self.blob.as_deref()
    }
}

impl ConfigPort for MemoryConfigStore {
    fn load(&self) -> Result<RoverConfig, ConfigError> {
        match &self.blob {
            Some(bytes) => decode(bytes),
            None => {
                info!("config: nothing stored, using defaults");
                Ok(RoverConfig::default())
            }
        }
    }

    fn save(&mut self, config: &RoverConfig) -> Result<(), ConfigError> {
        let bytes = encode(config)?;
        info!("config: saved ({} bytes, memory)", bytes.len());
        self.blob = Some(bytes);
        Ok(())
    }
}

// ── NVS store ────────────────────────────────────────────────

#[cfg(feature = "espidf")]
pub use nvs::NvsConfigStore;

#[cfg(feature = "espidf")]
mod nvs {
    use esp_idf_svc::sys::*;
    use log::{info, warn};

    use super::{ConfigError, ConfigPort, MAX_BLOB_SIZE, RoverConfig, decode, encode};

    const NAMESPACE: &[u8] = b"tiltdrive\0";
    const KEY: &[u8] = b"rovercfg\0";

    pub struct NvsConfigStore {
        _private: (),
    }

    impl NvsConfigStore {
        /// Initialise NVS flash, erasing the partition on version mismatch.
        pub fn new() -> Result<Self, ConfigError> {
            // SAFETY: called from main before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK as i32 || unsafe { nvs_flash_init() } != ESP_OK as i32 {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK as i32 {
                return Err(ConfigError::IoError);
            }
            info!("NvsConfigStore: NVS initialised");
            Ok(Self { _private: () })
        }

        /// Open the namespace, run `f` with the handle, then close.
        fn with_handle<T>(
            write: bool,
            f: impl FnOnce(nvs_handle_t) -> Result<T, i32>,
        ) -> Result<T, i32> {
            let mode = if write {
                nvs_open_mode_t_NVS_READWRITE
            } else {
                nvs_open_mode_t_NVS_READONLY
            };
            let mut handle: nvs_handle_t = 0;
            // SAFETY: NAMESPACE is null-terminated.
            let ret = unsafe { nvs_open(NAMESPACE.as_ptr().cast(), mode, &mut handle) };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            let result = f(handle);
            unsafe { nvs_close(handle) };
            result
        }
    }

    impl ConfigPort for NvsConfigStore {
        fn load(&self) -> Result<RoverConfig, ConfigError> {
            let result = Self::with_handle(false, |handle| {
                let mut size: usize = 0;
                // SAFETY: null buffer asks for the blob size only.
                let ret = unsafe {
                    nvs_get_blob(handle, KEY.as_ptr().cast(), core::ptr::null_mut(), &mut size)
                };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                if size == 0 || size > MAX_BLOB_SIZE {
                    return Err(ESP_ERR_NVS_INVALID_LENGTH);
                }
                let mut buf = vec![0u8; size];
                // SAFETY: buf holds exactly `size` bytes.
                let ret = unsafe {
                    nvs_get_blob(handle, KEY.as_ptr().cast(), buf.as_mut_ptr().cast(), &mut size)
                };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                Ok(buf)
            });

            match result {
                Ok(bytes) => {
                    info!("NvsConfigStore: loaded config ({} bytes)", bytes.len());
                    decode(&bytes)
                }
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND => {
                    info!("NvsConfigStore: no stored config, using defaults");
                    Ok(RoverConfig::default())
                }
                Err(e) => {
                    warn!("NvsConfigStore: read error {}", e);
                    Err(ConfigError::IoError)
                }
            }
        }

        fn save(&mut self, config: &RoverConfig) -> Result<(), ConfigError> {
            let bytes = encode(config)?;
            let result = Self::with_handle(true, |handle| {
                // SAFETY: bytes outlives the call; KEY is null-terminated.
                let ret = unsafe {
                    nvs_set_blob(handle, KEY.as_ptr().cast(), bytes.as_ptr().cast(), bytes.len())
                };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                Ok(())
            });
            match result {
                Ok(()) => {
                    info!("NvsConfigStore: config saved ({} bytes)", bytes.len());
                    Ok(())
                }
                Err(e) => {
                    warn!("NvsConfigStore: write error {}", e);
                    Err(ConfigError::IoError)
                }
            }
        }
    }
}
