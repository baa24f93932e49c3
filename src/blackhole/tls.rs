use crate::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::TlsAcceptor;

fn invalid(path: &Path, reason: impl ToString) -> Error {
    Error::InvalidTls {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, Error> {
    let mut reader = BufReader::new(File::open(path)?);
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| invalid(path, err))?;
    if certs.is_empty() {
        return Err(invalid(path, "no PEM certificates found"));
    }
    Ok(certs)
}

fn load_key(path: &Path) -> Result<PrivateKeyDer<'static>, Error> {
    let mut reader = BufReader::new(File::open(path)?);
    rustls_pemfile::private_key(&mut reader)
        .map_err(|err| invalid(path, err))?
        .ok_or_else(|| invalid(path, "no PEM private key found"))
}

/// Build a TLS acceptor from a PEM certificate chain and private key.
pub(super) fn acceptor(cert_path: &Path, key_path: &Path) -> Result<TlsAcceptor, Error> {
    let certs = load_certs(cert_path)?;
    let key = load_key(key_path)?;
    let config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|err| invalid(key_path, err))?;
    Ok(TlsAcceptor::from(Arc::new(config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_pair(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
        let generated = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        let (cert, key) = (dir.join("cert.pem"), dir.join("key.pem"));
        fs::write(&cert, generated.cert.pem()).unwrap();
        fs::write(&key, generated.signing_key.serialize_pem()).unwrap();
        (cert, key)
    }

    #[test]
    fn test_acceptor_from_pem_files() {
        let dir = tempfile::tempdir().unwrap();
        let (cert, key) = write_pair(dir.path());
        assert!(acceptor(&cert, &key).is_ok());
    }

    #[test]
    fn test_swapped_files_are_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let (cert, key) = write_pair(dir.path());
        let Err(err) = acceptor(&key, &cert) else {
            panic!("a private key was accepted as a certificate chain");
        };
        assert!(err.is_informative());
        assert!(matches!(err, Error::InvalidTls { .. }));
    }

    #[test]
    fn test_empty_files_are_invalid() {
        let empty = tempfile::NamedTempFile::new().unwrap();
        let Err(err) = acceptor(empty.path(), empty.path()) else {
            panic!("empty PEM files were accepted");
        };
        assert_eq!(
            err.to_string(),
            format!(
                "invalid TLS material in {}: no PEM certificates found",
                empty.path().display()
            )
        );
    }
}
