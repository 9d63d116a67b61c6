extern crate imapshell;

use imapshell::cli::{run, Command, Outcome};
use imapshell::error::{Error, EXIT_FOLDER_NOT_EMPTY};
use imapshell::session::Resolver;
use imapshell::testing::{FixedPrompter, MemoryConnector, MemoryStore, StoredMessage};
use imapshell::types::FlagSet;

const HELLO: &str = "From: Alice <alice@example.com>\r\n\
                     Subject: Hello\r\n\
                     \r\n\
                     See you at noon.\r\n";

fn resolver(servers: &[(&str, &MemoryStore)]) -> Resolver<MemoryConnector, FixedPrompter> {
    let connector = servers
        .iter()
        .fold(MemoryConnector::new(), |connector, (host, store)| {
            connector.with_server(host, (*store).clone())
        });
    Resolver::new(connector, FixedPrompter::new("jane", "secret"))
}

fn stdout(outcome: &Outcome) -> String {
    String::from_utf8(outcome.stdout.clone()).unwrap()
}

#[test]
fn login_lists_capabilities() {
    let server = MemoryStore::new();
    let mut resolver = resolver(&[("imap.example.com", &server)]);
    let outcome = run(
        &Command::Login {
            host: "imap.example.com".to_string(),
            no_ssl: false,
        },
        &mut resolver,
    )
    .unwrap();
    assert!(stdout(&outcome).lines().any(|l| l == "IMAP4rev1"));
    assert_eq!(outcome.exit_code, 0);
    assert_eq!(server.count("LOGOUT"), 1);
}

#[test]
fn folders_table() {
    let server = MemoryStore::new()
        .with_folder("INBOX", vec![StoredMessage::new(HELLO, &[]); 5])
        .with_folder("Sent", vec![StoredMessage::new(HELLO, &["\\Seen"]); 10]);
    let mut resolver = resolver(&[("imap.example.com", &server)]);
    let outcome = run(
        &Command::Folders {
            host: "jane@imap.example.com".to_string(),
            sort: false,
            no_ssl: false,
        },
        &mut resolver,
    )
    .unwrap();
    let text = stdout(&outcome);
    assert!(text.contains("| INBOX | "), "{}", text);
    assert!(text.contains("| 5        | 5      |"), "{}", text);
    assert!(text.contains("| 10       | 0      |"), "{}", text);
    assert_eq!(server.count("LOGOUT"), 1);
}

#[test]
fn peek_prints_body_untruncated() {
    let server = MemoryStore::new().with_folder("INBOX", vec![StoredMessage::new(HELLO, &[])]);
    let mut resolver = resolver(&[("imap.example.com", &server)]);
    let outcome = run(
        &Command::Peek {
            host: "imap.example.com".to_string(),
            folder: "INBOX".to_string(),
            messageid: 1,
            no_ssl: false,
        },
        &mut resolver,
    )
    .unwrap();
    let text = stdout(&outcome);
    assert!(text.ends_with(HELLO), "{}", text);
    assert!(text.contains("| Subject | Hello"), "{}", text);
}

#[test]
fn peek_missing_message_exit_code() {
    let server = MemoryStore::new().with_folder("INBOX", Vec::new());
    let mut resolver = resolver(&[("imap.example.com", &server)]);
    let err = run(
        &Command::Peek {
            host: "imap.example.com".to_string(),
            folder: "INBOX".to_string(),
            messageid: 1,
            no_ssl: false,
        },
        &mut resolver,
    )
    .unwrap_err();
    assert!(matches!(err, Error::MessageNotFound { seq: 1, .. }));
    assert_eq!(err.exit_code(), 7);
    assert_eq!(server.count("LOGOUT"), 1);
}

#[test]
fn copy_between_servers() {
    let old = MemoryStore::new().with_folder(
        "INBOX",
        vec![
            StoredMessage::new("Subject: a\r\n\r\n", &["\\Seen"]),
            StoredMessage::new("Subject: b\r\n\r\n", &["\\Recent"]),
            StoredMessage::new("Subject: c\r\n\r\n", &["\\Seen", "\\Flagged"]),
        ],
    );
    let new = MemoryStore::new().with_folder("Archive", Vec::new());
    let mut resolver = resolver(&[("old.example.com", &old), ("new.example.com", &new)]);

    let outcome = run(
        &Command::Copy {
            from: "jane@old.example.com".to_string(),
            from_folder: "INBOX".to_string(),
            to: "jane@new.example.com".to_string(),
            to_folder: "Archive".to_string(),
            from_no_ssl: false,
            to_no_ssl: true,
        },
        &mut resolver,
    )
    .unwrap();
    assert_eq!(stdout(&outcome), "Copied 3 messages from INBOX to Archive\n");

    let flags: Vec<FlagSet> = new
        .messages("Archive")
        .unwrap()
        .into_iter()
        .map(|m| m.flags)
        .collect();
    let expected: Vec<FlagSet> = vec![
        vec!["\\Seen"].into_iter().collect(),
        FlagSet::new(),
        vec!["\\Seen", "\\Flagged"].into_iter().collect(),
    ];
    assert_eq!(flags, expected);

    let logins = resolver.connector().logins();
    assert_eq!(logins.len(), 2);
    assert_eq!((logins[0].port, logins[0].tls), (993, true));
    assert_eq!((logins[1].port, logins[1].tls), (143, false));
}

#[test]
fn malformed_address_is_rejected_before_any_connection() {
    let old = MemoryStore::new().with_folder("INBOX", Vec::new());
    let mut resolver = resolver(&[("old.example.com", &old)]);
    let err = run(
        &Command::Copy {
            from: "old.example.com".to_string(),
            from_folder: "INBOX".to_string(),
            to: "new.example.com:imaps".to_string(),
            to_folder: "INBOX".to_string(),
            from_no_ssl: false,
            to_no_ssl: false,
        },
        &mut resolver,
    )
    .unwrap_err();
    assert_eq!(err.exit_code(), 3);
    assert!(resolver.connector().logins().is_empty());
}

#[test]
fn rmfolder_refusal_exit_code() {
    let server = MemoryStore::new().with_folder("Old", vec![StoredMessage::new(HELLO, &[])]);
    let mut resolver = resolver(&[("imap.example.com", &server)]);
    let command = |force| Command::RmFolder {
        host: "imap.example.com".to_string(),
        folder: "Old".to_string(),
        force,
        no_ssl: false,
    };

    let refused = run(&command(false), &mut resolver).unwrap();
    assert_eq!(refused.exit_code, EXIT_FOLDER_NOT_EMPTY);
    assert!(refused.notice.is_some());
    assert_eq!(server.count("DELETE"), 0);

    let deleted = run(&command(true), &mut resolver).unwrap();
    assert_eq!(deleted.exit_code, 0);
    assert_eq!(server.messages("Old"), None);
}

#[test]
fn merge_and_createfolder() {
    let server = MemoryStore::new().with_folder("Old", vec![StoredMessage::new(HELLO, &[]); 2]);
    let mut resolver = resolver(&[("imap.example.com", &server)]);

    run(
        &Command::CreateFolder {
            host: "imap.example.com".to_string(),
            folder: "New".to_string(),
            no_ssl: false,
        },
        &mut resolver,
    )
    .unwrap();
    let outcome = run(
        &Command::Merge {
            host: "imap.example.com".to_string(),
            from_folder: "Old".to_string(),
            to_folder: "New".to_string(),
            no_ssl: false,
        },
        &mut resolver,
    )
    .unwrap();
    assert_eq!(stdout(&outcome), "Moved 2 messages from Old to New\n");
    assert_eq!(server.messages("New").unwrap().len(), 2);
    assert!(server.messages("Old").unwrap().is_empty());
}

#[test]
fn wrong_password_exit_code() {
    let server = MemoryStore::new().with_password("right");
    let mut resolver = resolver(&[("imap.example.com", &server)]);
    let err = run(
        &Command::Folders {
            host: "imap.example.com".to_string(),
            sort: false,
            no_ssl: false,
        },
        &mut resolver,
    )
    .unwrap_err();
    assert_eq!(err.exit_code(), 5);
    assert_eq!(server.count("LIST"), 0);
}
