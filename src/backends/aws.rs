//! AWS credential resolution for the Route53 DNS-01 plugin.
//!
//! The default probe walks the standard AWS credential chain, the same one the Route53 plugin
//! uses: environment keys, shared config and credentials profiles (including `credential_process`
//! and SSO), web identity tokens, container credentials and finally instance metadata (IMDS).
//! Only "no provider produced credentials" is reported as missing credentials; any other failure
//! along the chain is a fault.

use crate::backends::CredentialProbe;
use crate::error::Error;
use anyhow::Context;
use aws_config::default_provider::credentials::DefaultCredentialsChain;
use aws_credential_types::provider::error::CredentialsError;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_credential_types::Credentials;

/// Checks that AWS credentials can be resolved.
#[derive(Debug, Clone, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct AwsCredentialProbe {
    // `None` resolves through the default chain, built when checked.
    provider: Option<SharedCredentialsProvider>,
}

impl AwsCredentialProbe {
    #[must_use]
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Resolve credentials through `provider` instead of the default chain.
    #[must_use]
    pub fn with_provider(provider: impl ProvideCredentials + 'static) -> Self {
        Self {
            provider: Some(SharedCredentialsProvider::new(provider)),
        }
    }

    async fn resolve(&self) -> Result<Credentials, CredentialsError> {
        let provider = match &self.provider {
            Some(provider) => provider.clone(),
            None => SharedCredentialsProvider::new(DefaultCredentialsChain::builder().build().await),
        };
        provider.provide_credentials().await
    }
}

impl CredentialProbe for AwsCredentialProbe {
    fn check(&self) -> Result<(), Error> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        match runtime.block_on(self.resolve()) {
            Ok(credentials) => {
                tracing::info!("found AWS credentials for key {}", credentials.access_key_id());
                Ok(())
            }
            Err(CredentialsError::CredentialsNotLoaded(_)) => Err(Error::NoCredentials),
            Err(err) => Err(Error::Internal(
                anyhow::Error::new(err).context("failed resolving AWS credentials"),
            )),
        }
    }
}
