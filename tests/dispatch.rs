use dns_block_blackhole::backends::{AcmeClient, CredentialProbe};
use dns_block_blackhole::dispatch::{EXIT_INFORMATIVE, EXIT_NOT_RUNNABLE, EXIT_SUCCESS};
use dns_block_blackhole::{Backends, Dispatcher, Error};
use std::cell::RefCell;
use std::rc::Rc;

type Calls = Rc<RefCell<Vec<Vec<String>>>>;

struct StaticCredentials(bool);

impl CredentialProbe for StaticCredentials {
    fn check(&self) -> Result<(), Error> {
        if self.0 {
            Ok(())
        } else {
            Err(Error::NoCredentials)
        }
    }
}

struct FakeCertbot {
    calls: Calls,
    succeed: bool,
}

impl AcmeClient for FakeCertbot {
    fn run(&self, args: &[String]) -> anyhow::Result<()> {
        self.calls.borrow_mut().push(args.to_vec());
        anyhow::ensure!(self.succeed, "certbot exited with status 1");
        Ok(())
    }
}

fn dispatcher(credentials: bool, certbot_succeeds: bool) -> (Dispatcher, Calls) {
    let calls = Calls::default();
    let recorded = calls.clone();
    let dispatcher = Dispatcher::default().with_probe(move || {
        Ok(Backends {
            credentials: Box::new(StaticCredentials(credentials)),
            acme: Box::new(FakeCertbot {
                calls: recorded.clone(),
                succeed: certbot_succeeds,
            }),
        })
    });
    (dispatcher, calls)
}

const ACQUIRE: &[&str] = &[
    "dns-block-blackhole",
    "certbot-route53",
    "acquire-cert",
    "-e",
    "a@b.com",
    "-d",
    "x.com",
];

#[test]
fn test_group_commands_print_help_and_exit_1() {
    let (dispatcher, calls) = dispatcher(true, true);
    assert_eq!(
        dispatcher.dispatch(["dns-block-blackhole"]).unwrap(),
        EXIT_NOT_RUNNABLE
    );
    assert_eq!(
        dispatcher
            .dispatch(["dns-block-blackhole", "-i", "certbot-route53"])
            .unwrap(),
        EXIT_NOT_RUNNABLE
    );
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_acquire_cert_invokes_certbot() {
    let (dispatcher, calls) = dispatcher(true, true);
    let argv = ACQUIRE.iter().chain(&["--", "--verbose"]).copied();
    assert_eq!(dispatcher.dispatch(argv).unwrap(), EXIT_SUCCESS);
    assert_eq!(
        *calls.borrow(),
        [[
            "certonly",
            "--non-interactive",
            "--agree-tos",
            "--keep",
            "--dns-route53",
            "-m",
            "a@b.com",
            "-d",
            "x.com",
            "--verbose"
        ]]
    );
}

#[test]
fn test_renew_cert_never_invokes_certbot() {
    let (dispatcher, calls) = dispatcher(true, true);
    let argv = [
        "dns-block-blackhole",
        "certbot-route53",
        "renew-cert",
        "-e",
        "a@b.com",
        "-d",
        "x.com",
    ];
    assert_eq!(dispatcher.dispatch(argv).unwrap(), EXIT_SUCCESS);
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_informative_errors_exit_2() {
    let (dispatcher, calls) = dispatcher(false, true);
    assert_eq!(dispatcher.dispatch(ACQUIRE.iter().copied()).unwrap(), EXIT_INFORMATIVE);

    let bad_email = [
        "dns-block-blackhole",
        "certbot-route53",
        "acquire-cert",
        "-e",
        "not-an-email",
        "-d",
        "x.com",
    ];
    assert_eq!(dispatcher.dispatch(bad_email).unwrap(), EXIT_INFORMATIVE);

    for argv in [
        &["dns-block-blackhole", "server", "--port", "70000"][..],
        &["dns-block-blackhole", "server", "--ssl", "-c", "/nonexistent/cert.pem"][..],
        &["dns-block-blackhole", "server", "--", "--verbose"][..],
    ] {
        assert_eq!(
            dispatcher.dispatch(argv.iter().copied()).unwrap(),
            EXIT_INFORMATIVE,
            "{argv:?}"
        );
    }
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_missing_certbot_is_informative() {
    let dispatcher = Dispatcher::default()
        .with_probe(|| Err(Error::MissingCollaborator("certbot".to_string())));
    assert_eq!(
        dispatcher.dispatch(ACQUIRE.iter().copied()).unwrap(),
        EXIT_INFORMATIVE
    );
}

#[test]
fn test_certbot_failure_propagates() {
    let (dispatcher, calls) = dispatcher(true, false);
    let err = dispatcher.dispatch(ACQUIRE.iter().copied()).unwrap_err();
    assert!(err.to_string().contains("certbot exited with status 1"));
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn test_usage_errors_use_clap_exit_code() {
    let (dispatcher, _) = dispatcher(true, true);
    assert_eq!(
        dispatcher
            .dispatch(["dns-block-blackhole", "no-such-command"])
            .unwrap(),
        2
    );
    assert_eq!(
        dispatcher
            .dispatch(["dns-block-blackhole", "certbot-route53", "acquire-cert"])
            .unwrap(),
        2
    );
    assert_eq!(
        dispatcher.dispatch(["dns-block-blackhole", "--help"]).unwrap(),
        0
    );
}
