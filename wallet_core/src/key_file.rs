//! Plain hex key files.
//!
//! A key file holds one line: the 32-byte secp256k1 secret as `0x`-prefixed
//! hex. On Unix the file is created with mode `0600`.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use idproof_types::PrivateKey;
use zeroize::Zeroize;

use crate::error::WalletError;

fn io_err(path: &Path, source: std::io::Error) -> WalletError {
    WalletError::KeyFile {
        path: path.display().to_string(),
        source,
    }
}

/// Write `key` to a new file at `path`. Refuses to overwrite an existing file.
pub fn save_key_file(key: &PrivateKey, path: &Path) -> Result<(), WalletError> {
    if path.exists() {
        return Err(WalletError::KeyFileExists(path.display().to_string()));
    }

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(|e| io_err(path, e))?;
    let mut line = key.to_hex();
    line.push('\n');
    let result = file.write_all(line.as_bytes());
    line.zeroize();
    result.map_err(|e| io_err(path, e))?;
    tracing::debug!(path = %path.display(), "key file written");
    Ok(())
}

/// Read a key written by [`save_key_file`] (or any file holding one hex secret).
pub fn load_key_file(path: &Path) -> Result<PrivateKey, WalletError> {
    let mut contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let parsed = PrivateKey::from_hex(&contents);
    contents.zeroize();
    parsed.map_err(|e| WalletError::Key(format!("{}: {e}", path.display())))
}
