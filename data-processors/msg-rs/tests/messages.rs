mod common;

use common::*;
use msg_rs::named::PropertySet;
use msg_rs::tags::*;
use msg_rs::*;

fn open(store: MemoryStore, sink: &CollectingSink) -> Msg<MemoryStore> {
    init();
    Msg::open(store, &DecodeConfig::default(), sink).unwrap()
}

fn weekly_pattern() -> Vec<u8> {
    let mut b = Vec::new();
    for v in [0x3004u16, 0x3004, 0x200b, 0x0001, 0x0000] {
        b.extend_from_slice(&v.to_le_bytes());
    }
    for v in [0u32, 1, 0, 0x02, 0x2023, 0, 1, 0, 0, 0x0d42_b5a0, 0x5ae9_80df] {
        b.extend_from_slice(&v.to_le_bytes());
    }
    b
}

#[test]
fn plain_message() {
    let mut store = MemoryStore::new();
    ObjectBuilder::message()
        .counts(2, 0)
        .unicode(PID_TAG_MESSAGE_CLASS, "IPM.Note")
        .unicode(PID_TAG_SUBJECT, "Quarterly report")
        .unicode(PID_TAG_SENDER_NAME, "Bob")
        .unicode(PID_TAG_SENDER_SMTP_ADDRESS, "bob@example.com")
        .unicode(PID_TAG_DISPLAY_TO, "Alice")
        .unicode(PID_TAG_DISPLAY_CC, "Carol")
        .unicode(PID_TAG_BODY, "See attached")
        .int(PID_TAG_IMPORTANCE, 2)
        .time(PID_TAG_CLIENT_SUBMIT_TIME, JAN_1_2024_0930)
        .write(&mut store, "");
    ObjectBuilder::child()
        .int(PID_TAG_RECIPIENT_TYPE, 1)
        .unicode(PID_TAG_DISPLAY_NAME, "Alice")
        .unicode(PID_TAG_SMTP_ADDRESS, "alice@example.com")
        .write(&mut store, &recipient_storage("", 0));
    ObjectBuilder::child()
        .int(PID_TAG_RECIPIENT_TYPE, 2)
        .unicode(PID_TAG_RECIPIENT_DISPLAY_NAME, "Carol")
        .unicode(PID_TAG_EMAIL_ADDRESS, "carol@example.com")
        .write(&mut store, &recipient_storage("", 1));

    let sink = CollectingSink::new();
    let msg = open(store, &sink);
    assert_eq!(msg.kind(), MessageKind::Plain);
    assert!(!msg.is_embedded());
    assert_eq!(msg.subject(), Some("Quarterly report"));
    assert_eq!(msg.sender().as_deref(), Some("Bob <bob@example.com>"));
    assert_eq!(msg.importance(), Some(Importance::High));
    assert_eq!(msg.body(), Some("See attached"));
    assert!(msg.html_body().is_none());

    let rcpts = msg.recipients();
    assert_eq!(rcpts.len(), 2);
    assert_eq!(rcpts[0].kind(), Some(RecipientType::To));
    assert_eq!(
        rcpts[0].formatted().as_deref(),
        Some("Alice <alice@example.com>")
    );
    assert_eq!(rcpts[1].name(), Some("Carol"));
    assert_eq!(rcpts[1].email(), Some("carol@example.com"));
    assert_eq!(msg.recipients_of(RecipientType::Cc).len(), 1);

    let block = msg.header_block();
    assert_eq!(block.get("", "Sent"), Some("Mon, 01 Jan 2024 09:30 +0000"));
    assert_eq!(
        block.to_string(),
        "From: Bob <bob@example.com>\n\
         Sent: Mon, 01 Jan 2024 09:30 +0000\n\
         To: Alice\n\
         Cc: Carol\n\
         Subject: Quarterly report\n"
    );
    // Cached
    assert!(std::ptr::eq(block, msg.header_block()));
    assert!(sink.diagnostics().is_empty());
}

#[test]
fn one_malformed_description_among_nine() {
    let mut store = MemoryStore::new();
    ObjectBuilder::message()
        .unicode(PID_TAG_MESSAGE_CLASS, "IPM.Note")
        .unicode(PID_TAG_SUBJECT, "Hello")
        .int(PID_TAG_IMPORTANCE, 1)
        .int(PID_TAG_SENSITIVITY, 0)
        .int(PID_TAG_PRIORITY, -1)
        .int(PID_TAG_MESSAGE_FLAGS, 1)
        // String8 with a zero length
        .raw(description(PID_TAG_NORMALIZED_SUBJECT, 0x001e, 6, [0; 8]))
        .time(PID_TAG_CLIENT_SUBMIT_TIME, JAN_1_2024_0930)
        .time(PID_TAG_MESSAGE_DELIVERY_TIME, JAN_1_2024_1030)
        .write(&mut store, "");

    let sink = CollectingSink::new();
    let msg = open(store, &sink);
    assert_eq!(msg.properties().records().len(), 8);
    assert_eq!(msg.properties().len(), 8);
    assert_eq!(
        sink.count(|d| matches!(d, Diagnostic::MalformedProperty { .. })),
        1
    );
    assert_eq!(msg.priority(), Some(Priority::NotUrgent));
    assert_eq!(msg.subject(), Some("Hello"));
    assert!(msg.properties().string(PID_TAG_NORMALIZED_SUBJECT).is_none());
}

fn forward_notification(recurrence: Option<Vec<u8>>) -> MemoryStore {
    let mut store = MemoryStore::new();
    write_named_map(
        &mut store,
        &[
            (PropertySet::Appointment, PID_LID_LOCATION),
            (PropertySet::Appointment, PID_LID_APPOINTMENT_START_WHOLE),
            (PropertySet::Appointment, PID_LID_APPOINTMENT_END_WHOLE),
            (PropertySet::Appointment, PID_LID_APPOINTMENT_RECUR),
            (PropertySet::Appointment, PID_LID_RECURRENCE_PATTERN),
            (
                PropertySet::Appointment,
                PID_LID_FORWARD_NOTIFICATION_RECIPIENTS,
            ),
            (PropertySet::Common, PID_LID_PROMPT_SEND_UPDATE),
        ],
    );
    let mut msg = ObjectBuilder::message()
        .unicode(
            PID_TAG_MESSAGE_CLASS,
            "IPM.Schedule.Meeting.Notification.Forward",
        )
        .unicode(PID_TAG_SUBJECT, "Planning")
        .unicode(PID_TAG_SENT_REPRESENTING_NAME, "Bob")
        .unicode(PID_TAG_DISPLAY_TO, "Alice")
        .int(PID_TAG_IMPORTANCE, 2)
        .unicode(0x8000, "Room 1")
        .time(0x8001, JAN_1_2024_0930)
        .time(0x8002, JAN_1_2024_1030)
        .unicode(0x8004, "every Monday")
        .binary(0x8005, b"\x01\x00\x00\x00fwd")
        .bool(0x8006, true);
    if let Some(recurrence) = recurrence {
        msg = msg.binary(0x8003, &recurrence);
    }
    msg.write(&mut store, "");
    store
}

#[test]
fn meeting_forward_notification() {
    let sink = CollectingSink::new();
    let msg = open(forward_notification(Some(weekly_pattern())), &sink);
    assert_eq!(msg.kind(), MessageKind::MeetingForwardNotification);
    let MessageVariant::MeetingForwardNotification(fwd) = msg.message() else {
        panic!("unexpected variant {:?}", msg.kind());
    };
    assert_eq!(fwd.location(), Some("Room 1"));
    assert!(fwd.prompt_send_update());
    assert_eq!(
        fwd.forward_notification_recipients(),
        Some(&b"\x01\x00\x00\x00fwd"[..])
    );
    assert_eq!(fwd.recurrence_type(), "Weekly");
    assert_eq!(fwd.organizer(), Some("Bob"));
    assert!(msg.message().as_calendar().is_some());

    let block = msg.header_block();
    assert_eq!(block.get("-main info-", "Location"), Some("Room 1"));
    assert_eq!(block.get("-date-", "End"), Some("Mon, 01 Jan 2024 10:30 +0000"));
    assert_eq!(block.get("-recurrence-", "Recurrance"), Some("Weekly"));
    assert_eq!(
        block.get("-attendees-", "Required Attendees"),
        Some("Alice")
    );
    assert_eq!(block.get("-attendees-", "Resources"), None);
    assert_eq!(
        block.to_string(),
        "-main info-\n\
         Subject: Planning\n\
         Location: Room 1\n\
         \n\
         -date-\n\
         Start: Mon, 01 Jan 2024 09:30 +0000\n\
         End: Mon, 01 Jan 2024 10:30 +0000\n\
         \n\
         -recurrence-\n\
         Recurrance: Weekly\n\
         Recurrence Pattern: every Monday\n\
         \n\
         -attendees-\n\
         Organizer: Bob\n\
         Required Attendees: Alice\n\
         \n\
         -importance-\n\
         Importance: High\n"
    );
    assert!(sink.diagnostics().is_empty());
}

#[test]
fn forward_notification_without_recurrence() {
    let sink = CollectingSink::new();
    let msg = open(forward_notification(None), &sink);
    let cal = msg.message().as_calendar().unwrap();
    assert!(cal.recurrence().is_none());
    assert_eq!(cal.recurrence_type(), "(none)");
    assert_eq!(
        msg.header_block().get("-recurrence-", "Recurrance"),
        Some("(none)")
    );
}

#[test]
fn truncated_recurrence_is_reported() {
    let mut pattern = weekly_pattern();
    pattern.truncate(20);
    let sink = CollectingSink::new();
    let msg = open(forward_notification(Some(pattern)), &sink);
    let cal = msg.message().as_calendar().unwrap();
    assert!(cal.recurrence().is_none());
    assert_eq!(cal.recurrence_type(), "(none)");
    assert_eq!(
        sink.diagnostics(),
        vec![Diagnostic::MalformedProperty {
            tag: Some(PropertyTag(0x8003_0102)),
            reason: "truncated recurrence pattern".to_string(),
        }]
    );
}

#[test]
fn named_property_lookup() {
    let sink = CollectingSink::new();
    let msg = open(forward_notification(None), &sink);
    let props = msg.properties();
    assert_eq!(
        props
            .get_named(
                &NamedIdentifier::Numeric(PID_LID_PROMPT_SEND_UPDATE),
                &PropertySet::Common.guid()
            )
            .and_then(|v| v.as_bool()),
        Some(true)
    );
    assert!(
        props
            .get_named(
                &NamedIdentifier::Numeric(PID_LID_PROMPT_SEND_UPDATE),
                &PropertySet::Appointment.guid()
            )
            .is_none()
    );
    assert_eq!(msg.named_map().len(), 7);
}

#[test]
fn unmapped_named_property_is_kept() {
    let mut store = MemoryStore::new();
    ObjectBuilder::message()
        .unicode(PID_TAG_MESSAGE_CLASS, "IPM.Note")
        .int(0x8010, 42)
        .write(&mut store, "");
    let sink = CollectingSink::new();
    let msg = open(store, &sink);
    assert_eq!(msg.properties().int(0x8010), Some(42));
    assert_eq!(
        sink.diagnostics(),
        vec![Diagnostic::UnmappedNamedProperty {
            tag: PropertyTag(0x8010_0003)
        }]
    );
}

#[test]
fn appointment_and_meeting() {
    for (class, kind) in [
        ("IPM.Appointment", MessageKind::Appointment),
        ("IPM.Schedule.Meeting.Request", MessageKind::MeetingRelated),
    ] {
        let mut store = MemoryStore::new();
        write_named_map(
            &mut store,
            &[
                (PropertySet::Appointment, PID_LID_LOCATION),
                (PropertySet::Appointment, PID_LID_RECURRING),
                (PropertySet::Appointment, PID_LID_APPOINTMENT_RECUR),
                (PropertySet::Appointment, PID_LID_BUSY_STATUS),
            ],
        );
        ObjectBuilder::message()
            .unicode(PID_TAG_MESSAGE_CLASS, class)
            .unicode(PID_TAG_SUBJECT, "Standup")
            .unicode(0x8000, "Room 2")
            .bool(0x8001, true)
            .binary(0x8002, &weekly_pattern())
            .int(0x8003, 2)
            .write(&mut store, "");
        let sink = CollectingSink::new();
        let msg = open(store, &sink);
        assert_eq!(msg.kind(), kind);
        let cal = msg.message().as_calendar().unwrap();
        assert!(cal.is_recurring());
        assert_eq!(cal.busy_status(), Some(BusyStatus::Busy));
        assert_eq!(cal.recurrence().unwrap().period, 1);
        assert_eq!(cal.recurrence_type(), "Weekly");
        let block = msg.header_block();
        assert_eq!(block.get("-main info-", "Location"), Some("Room 2"));
        assert!(!block.to_string().contains("-importance-"));
    }
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn messages_are_send_and_sync() {
    assert_send_sync::<Msg<MemoryStore>>();
    assert_send_sync::<MessageVariant>();
    assert_send_sync::<PropertyStore>();
}

#[test]
fn header_block_is_cached() {
    for (class, section) in [
        ("IPM.Note", ""),
        ("IPM.Appointment", "-main info-"),
        ("IPM.Schedule.Meeting.Notification.Forward", "-main info-"),
    ] {
        let mut store = MemoryStore::new();
        ObjectBuilder::message()
            .unicode(PID_TAG_MESSAGE_CLASS, class)
            .unicode(PID_TAG_SUBJECT, "Standup")
            .write(&mut store, "");
        let sink = CollectingSink::new();
        let msg = open(store, &sink);
        let message = msg.message().as_message();
        let first = message.header_block();
        let second = message.header_block();
        assert!(std::ptr::eq(first, second), "{class}");
        assert_eq!(first.get(section, "Subject"), Some("Standup"));
    }
}

#[test]
fn embedded_task() {
    let mut store = MemoryStore::new();
    write_named_map(
        &mut store,
        &[
            (PropertySet::Task, PID_LID_TASK_STATUS),
            (PropertySet::Task, PID_LID_PERCENT_COMPLETE),
            (PropertySet::Task, PID_LID_TASK_OWNER),
        ],
    );
    ObjectBuilder::message()
        .counts(0, 1)
        .unicode(PID_TAG_MESSAGE_CLASS, "IPM.Note")
        .unicode(PID_TAG_SUBJECT, "FW: task")
        .write(&mut store, "");
    ObjectBuilder::child()
        .int(PID_TAG_ATTACH_METHOD, 5)
        .unicode(PID_TAG_DISPLAY_NAME, "Write report")
        .write(&mut store, &attachment_storage("", 0));
    ObjectBuilder::embedded()
        .unicode(PID_TAG_MESSAGE_CLASS, "IPM.Task")
        .unicode(PID_TAG_SUBJECT, "Write report")
        .int(0x8000, 1)
        .fixed(0x8001, 0x0005, 0.5f64.to_le_bytes())
        .unicode(0x8002, "Alice")
        .write(&mut store, &embedded_storage("", 0));

    let sink = CollectingSink::new();
    let msg = open(store, &sink);
    let attachment = &msg.attachments()[0];
    assert_eq!(attachment.method(), Some(AttachMethod::EmbeddedMessage));
    assert_eq!(attachment.name(), Some("Write report"));
    let embedded = attachment.embedded_message().unwrap();
    assert!(embedded.is_embedded());
    let MessageVariant::Task(task) = embedded else {
        panic!("unexpected variant {:?}", embedded.kind());
    };
    assert_eq!(task.status(), Some(TaskStatus::InProgress));
    assert_eq!(task.percent_complete(), Some(0.5));
    assert_eq!(task.owner(), Some("Alice"));
    assert_eq!(
        task.header_block().get("-main info-", "Percent Complete"),
        Some("50%")
    );
    assert!(sink.diagnostics().is_empty());
}

fn nested_message() -> MemoryStore {
    let mut store = MemoryStore::new();
    ObjectBuilder::message()
        .counts(0, 1)
        .unicode(PID_TAG_MESSAGE_CLASS, "IPM.Note")
        .write(&mut store, "");
    ObjectBuilder::child()
        .int(PID_TAG_ATTACH_METHOD, 5)
        .write(&mut store, &attachment_storage("", 0));
    ObjectBuilder::embedded()
        .unicode(PID_TAG_MESSAGE_CLASS, "IPM.Note")
        .unicode(PID_TAG_SUBJECT, "inner")
        .write(&mut store, &embedded_storage("", 0));
    store
}

#[test]
fn embedding_depth_limit() {
    init();
    let config = DecodeConfig {
        max_embedding_depth: 0,
        ..Default::default()
    };

    let sink = CollectingSink::new();
    let msg = Msg::open(nested_message(), &config, &sink).unwrap();
    let attachment = &msg.attachments()[0];
    assert!(attachment.embedded_message().is_none());
    assert!(attachment.broken().is_some());
    assert_eq!(
        sink.count(|d| matches!(d, Diagnostic::BrokenAttachment { .. })),
        1
    );

    let config = DecodeConfig {
        max_embedding_depth: 0,
        attachment_errors: AttachErrorBehavior::Throw,
        ..Default::default()
    };
    let res = Msg::open(nested_message(), &config, &CollectingSink::new());
    assert!(matches!(res, Err(MsgError::EmbeddingTooDeep(0))));

    let sink = CollectingSink::new();
    let msg = Msg::open(nested_message(), &DecodeConfig::default(), &sink).unwrap();
    let inner = msg.attachments()[0].embedded_message().unwrap();
    assert_eq!(inner.subject(), Some("inner"));
}

#[test]
fn missing_embedded_storage() {
    let mut store = nested_message();
    store.remove_storage(&embedded_storage("", 0));
    let sink = CollectingSink::new();
    let msg = open(store, &sink);
    assert!(msg.attachments()[0].broken().is_some());
    assert_eq!(
        sink.count(|d| matches!(d, Diagnostic::BrokenAttachment { .. })),
        1
    );
}

#[test]
fn missing_recipient_storage() {
    let mut store = MemoryStore::new();
    ObjectBuilder::message()
        .counts(2, 0)
        .unicode(PID_TAG_MESSAGE_CLASS, "IPM.Note")
        .write(&mut store, "");
    ObjectBuilder::child()
        .unicode(PID_TAG_DISPLAY_NAME, "Alice")
        .write(&mut store, &recipient_storage("", 0));
    let sink = CollectingSink::new();
    let msg = open(store, &sink);
    assert_eq!(msg.recipients().len(), 1);
    assert_eq!(
        sink.diagnostics(),
        vec![Diagnostic::MissingStorage {
            path: "__recip_version1.0_#00000001/".to_string()
        }]
    );
}

#[test]
fn oversized_counts_stop_at_first_gap() {
    let mut store = MemoryStore::new();
    ObjectBuilder::message()
        .counts(u32::MAX, u32::MAX)
        .unicode(PID_TAG_MESSAGE_CLASS, "IPM.Note")
        .write(&mut store, "");
    ObjectBuilder::child()
        .unicode(PID_TAG_DISPLAY_NAME, "Alice")
        .write(&mut store, &recipient_storage("", 0));
    let sink = CollectingSink::new();
    let msg = open(store, &sink);
    assert_eq!(msg.recipients().len(), 1);
    assert!(msg.attachments().is_empty());
    assert_eq!(
        sink.diagnostics(),
        vec![
            Diagnostic::MissingStorage {
                path: "__recip_version1.0_#00000001/".to_string()
            },
            Diagnostic::MissingStorage {
                path: "__attach_version1.0_#00000000/".to_string()
            },
        ]
    );
}

#[test]
fn unreadable_message() {
    init();
    let res = Msg::open(
        MemoryStore::new(),
        &DecodeConfig::default(),
        &CollectingSink::new(),
    );
    assert!(res.is_err_and(|e| e.is_not_found()));

    let mut store = MemoryStore::new();
    store.insert("__properties_version1.0", vec![0u8; 20]);
    let res = Msg::open(store, &DecodeConfig::default(), &CollectingSink::new());
    assert!(matches!(
        res,
        Err(MsgError::TruncatedHeader { expected: 32, .. })
    ));
}

#[test]
fn signed_message() {
    let mut store = MemoryStore::new();
    ObjectBuilder::message()
        .counts(0, 1)
        .unicode(PID_TAG_MESSAGE_CLASS, "IPM.Note.SMIME.MultipartSigned")
        .unicode(PID_TAG_SUBJECT, "Signed")
        .write(&mut store, "");
    ObjectBuilder::child()
        .int(PID_TAG_ATTACH_METHOD, 1)
        .unicode(PID_TAG_ATTACH_MIME_TAG, "multipart/signed")
        .unicode(PID_TAG_ATTACH_LONG_FILENAME, "smime.p7m")
        .binary(PID_TAG_ATTACH_DATA, b"Content-Type: multipart/signed")
        .write(&mut store, &attachment_storage("", 0));
    let sink = CollectingSink::new();
    let msg = open(store, &sink);
    let MessageVariant::Signed(signed) = msg.message() else {
        panic!("unexpected variant {:?}", msg.kind());
    };
    assert_eq!(
        signed.signed_data(),
        Some(&b"Content-Type: multipart/signed"[..])
    );
    assert_eq!(signed.signed_attachment().unwrap().name(), Some("smime.p7m"));
    assert_eq!(signed.header_block().get("", "Subject"), Some("Signed"));
}

#[test]
fn contact() {
    let mut store = MemoryStore::new();
    write_named_map(
        &mut store,
        &[
            (PropertySet::Address, PID_LID_EMAIL1_EMAIL_ADDRESS),
            (PropertySet::Address, PID_LID_EMAIL3_EMAIL_ADDRESS),
        ],
    );
    ObjectBuilder::message()
        .unicode(PID_TAG_MESSAGE_CLASS, "IPM.Contact")
        .unicode(PID_TAG_DISPLAY_NAME, "Alice Smith")
        .unicode(PID_TAG_GIVEN_NAME, "Alice")
        .unicode(PID_TAG_SURNAME, "Smith")
        .unicode(PID_TAG_COMPANY_NAME, "Example Ltd")
        .int(PID_TAG_GENDER, 1)
        .unicode(0x8000, "alice@example.com")
        .unicode(0x8001, "alice@example.org")
        .write(&mut store, "");
    let sink = CollectingSink::new();
    let msg = open(store, &sink);
    let MessageVariant::Contact(contact) = msg.message() else {
        panic!("unexpected variant {:?}", msg.kind());
    };
    assert_eq!(contact.surname(), Some("Smith"));
    assert_eq!(contact.gender(), Some(Gender::Female));
    assert_eq!(
        contact.emails(),
        vec!["alice@example.com", "alice@example.org"]
    );
    let block = contact.header_block();
    assert_eq!(block.get("-email-", "Email 2"), None);
    assert_eq!(block.get("-email-", "Email 3"), Some("alice@example.org"));
    assert_eq!(block.get("-business-", "Company"), Some("Example Ltd"));
}
