//! External collaborators used by the certificate commands.
//!
//! Two seams are defined here: [`CredentialProbe`] checks that the DNS provider's credentials
//! resolve, and [`AcmeClient`] runs the ACME client with a prepared argument list. The
//! production implementations are [`aws::AwsCredentialProbe`] and [`certbot::CertbotProcess`].

use crate::error::Error;

pub mod aws;
pub mod certbot;

pub use aws::AwsCredentialProbe;
pub use certbot::CertbotProcess;

/// Checks that credentials for the DNS provider API can be resolved.
pub trait CredentialProbe {
    /// # Errors
    ///
    /// Returns [`Error::NoCredentials`] when nothing resolves.
    fn check(&self) -> Result<(), Error>;
}

/// Runs the ACME client to completion.
pub trait AcmeClient {
    /// # Errors
    ///
    /// Returns an error if the client can't be started or exits unsuccessfully.
    fn run(&self, args: &[String]) -> anyhow::Result<()>;
}

/// The collaborators available to a single invocation.
pub struct Backends {
    pub credentials: Box<dyn CredentialProbe>,
    pub acme: Box<dyn AcmeClient>,
}

impl Backends {
    /// Locate the collaborators in the current environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCollaborator`] if the certbot executable can't be found.
    pub fn probe() -> Result<Self, Error> {
        let acme = CertbotProcess::locate()?;
        tracing::debug!("using certbot at {}", acme.program().display());
        Ok(Self {
            credentials: Box::new(AwsCredentialProbe::from_env()),
            acme: Box::new(acme),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{AcmeClient, Backends, CredentialProbe};
    use crate::error::Error;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub(crate) enum Outcome {
        #[default]
        Succeed,
        Fail,
    }

    #[derive(Default)]
    struct State {
        credentials: Outcome,
        acme: Outcome,
        credential_checks: usize,
        calls: Vec<Vec<String>>,
    }

    /// Fake backends that record what they were asked to do.
    #[derive(Default, Clone)]
    pub(crate) struct Recorder(Rc<RefCell<State>>);

    impl Recorder {
        pub(crate) fn with_credentials(outcome: Outcome) -> Self {
            let recorder = Self::default();
            recorder.0.borrow_mut().credentials = outcome;
            recorder
        }

        pub(crate) fn with_acme(outcome: Outcome) -> Self {
            let recorder = Self::default();
            recorder.0.borrow_mut().acme = outcome;
            recorder
        }

        pub(crate) fn backends(&self) -> Backends {
            Backends {
                credentials: Box::new(self.clone()),
                acme: Box::new(self.clone()),
            }
        }

        pub(crate) fn calls(&self) -> Vec<Vec<String>> {
            self.0.borrow().calls.clone()
        }

        pub(crate) fn credential_checks(&self) -> usize {
            self.0.borrow().credential_checks
        }
    }

    impl CredentialProbe for Recorder {
        fn check(&self) -> Result<(), Error> {
            let mut state = self.0.borrow_mut();
            state.credential_checks += 1;
            match state.credentials {
                Outcome::Succeed => Ok(()),
                Outcome::Fail => Err(Error::NoCredentials),
            }
        }
    }

    impl AcmeClient for Recorder {
        fn run(&self, args: &[String]) -> anyhow::Result<()> {
            let mut state = self.0.borrow_mut();
            match state.acme {
                Outcome::Succeed => {
                    state.calls.push(args.to_vec());
                    Ok(())
                }
                Outcome::Fail => anyhow::bail!("certbot exited with status 1"),
            }
        }
    }
}
