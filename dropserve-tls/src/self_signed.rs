//! Self-signed certificate generation
//!
//! 🔐 Generates a fresh P-256 key pair and a one-year certificate for
//! `localhost` on every start. Nothing touches the disk.

use rand::RngCore;
use rcgen::{
    CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose, KeyPair,
    KeyUsagePurpose, PKCS_ECDSA_P256_SHA256, SerialNumber,
};
use rustls::pki_types::{CertificateDer, PrivatePkcs8KeyDer};
use thiserror::Error;
use time::{Duration, OffsetDateTime};

/// Common name and SAN of every generated certificate
pub const COMMON_NAME: &str = "localhost";

/// Certificate lifetime in days
pub const VALIDITY_DAYS: i64 = 365;

/// Serial number length in bytes (top bit cleared, so 127 random bits)
const SERIAL_LEN: usize = 16;

/// TLS setup errors
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("🔧 Certificate generation error: {0}")]
    Generation(#[from] rcgen::Error),

    #[error("🔐 TLS configuration error: {0}")]
    Config(#[from] rustls::Error),
}

/// 📜 In-memory certificate and private key
#[derive(Debug)]
pub struct SelfSignedCredential {
    cert_der: CertificateDer<'static>,
    key_der: PrivatePkcs8KeyDer<'static>,
    serial: Vec<u8>,
    not_before: OffsetDateTime,
    not_after: OffsetDateTime,
}

impl SelfSignedCredential {
    /// Generate a credential using the OS random source for the serial
    pub fn generate() -> Result<Self, TlsError> {
        Self::generate_with_rng(&mut rand::rngs::OsRng)
    }

    /// Generate a credential drawing the serial number from `rng`.
    ///
    /// The key pair always comes from the crypto provider's own RNG.
    pub fn generate_with_rng<R: RngCore + ?Sized>(rng: &mut R) -> Result<Self, TlsError> {
        let key_pair = KeyPair::generate_for(&PKCS_ECDSA_P256_SHA256)?;

        let serial = random_serial(rng);
        let not_before = OffsetDateTime::now_utc();
        let not_after = not_before + Duration::days(VALIDITY_DAYS);

        let mut params = CertificateParams::new(vec![COMMON_NAME.to_string()])?;
        let mut name = DistinguishedName::new();
        name.push(DnType::CommonName, COMMON_NAME);
        params.distinguished_name = name;
        params.not_before = not_before;
        params.not_after = not_after;
        params.serial_number = Some(SerialNumber::from_slice(&serial));
        params.key_usages = vec![
            KeyUsagePurpose::DigitalSignature,
            KeyUsagePurpose::KeyEncipherment,
        ];
        params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];

        let cert = params.self_signed(&key_pair)?;

        tracing::info!(
            "🔐 Generated self-signed certificate for {} (valid until {})",
            COMMON_NAME,
            not_after
        );

        Ok(Self {
            cert_der: cert.der().clone(),
            key_der: PrivatePkcs8KeyDer::from(key_pair.serialize_der()),
            serial,
            not_before,
            not_after,
        })
    }

    /// DER-encoded certificate
    pub fn cert_der(&self) -> &CertificateDer<'static> {
        &self.cert_der
    }

    /// PKCS#8 DER-encoded private key
    pub fn key_der(&self) -> &PrivatePkcs8KeyDer<'static> {
        &self.key_der
    }

    /// Big-endian serial number bytes
    pub fn serial(&self) -> &[u8] {
        &self.serial
    }

    pub fn not_before(&self) -> OffsetDateTime {
        self.not_before
    }

    pub fn not_after(&self) -> OffsetDateTime {
        self.not_after
    }
}

/// Positive, non-zero serial number
fn random_serial<R: RngCore + ?Sized>(rng: &mut R) -> Vec<u8> {
    let mut serial = vec![0u8; SERIAL_LEN];
    rng.fill_bytes(&mut serial);
    serial[0] &= 0x7f;
    if serial.iter().all(|b| *b == 0) {
        serial[SERIAL_LEN - 1] = 1;
    }
    serial
}
