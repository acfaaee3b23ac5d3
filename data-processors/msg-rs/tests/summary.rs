mod common;

use common::*;
use msg_rs::tags::*;
use msg_rs::*;
use serde_json::json;

#[test]
fn message_summary() {
    init();
    let mut store = MemoryStore::new();
    ObjectBuilder::message()
        .counts(1, 4)
        .unicode(PID_TAG_MESSAGE_CLASS, "IPM.Note")
        .unicode(PID_TAG_SUBJECT, "Report")
        .unicode(PID_TAG_SENDER_EMAIL_ADDRESS, "bob@example.com")
        .unicode(
            PID_TAG_TRANSPORT_MESSAGE_HEADERS,
            "From: Bob <bob@example.com>\r\n\
             X-Mailer: Outlook\r\n\
             Subject: Report\r\n\
             \tcontinued\r\n\
             Message-ID: <1@example.com>\r\n",
        )
        .unicode(PID_TAG_BODY, "text")
        .binary(PID_TAG_RTF_COMPRESSED, b"rtf")
        .write(&mut store, "");
    ObjectBuilder::child()
        .int(PID_TAG_RECIPIENT_TYPE, 3)
        .unicode(PID_TAG_DISPLAY_NAME, "Carol")
        .write(&mut store, &recipient_storage("", 0));
    ObjectBuilder::child()
        .int(PID_TAG_ATTACH_METHOD, 1)
        .unicode(PID_TAG_ATTACH_LONG_FILENAME, "report.pdf")
        .unicode(PID_TAG_ATTACH_MIME_TAG, "application/pdf")
        .binary(PID_TAG_ATTACH_DATA, b"%PDF-1.4")
        .write(&mut store, &attachment_storage("", 0));
    ObjectBuilder::child()
        .int(PID_TAG_ATTACH_METHOD, 2)
        .unicode(PID_TAG_ATTACH_PATHNAME, "\\\\server\\share\\file.doc")
        .write(&mut store, &attachment_storage("", 1));
    ObjectBuilder::child()
        .int(PID_TAG_ATTACH_METHOD, 5)
        .write(&mut store, &attachment_storage("", 2));
    ObjectBuilder::embedded()
        .unicode(PID_TAG_MESSAGE_CLASS, "IPM.Note")
        .unicode(PID_TAG_SUBJECT, "Inner")
        .write(&mut store, &embedded_storage("", 2));
    // Embedded message without its storage
    ObjectBuilder::child()
        .int(PID_TAG_ATTACH_METHOD, 5)
        .write(&mut store, &attachment_storage("", 3));

    let sink = CollectingSink::new();
    let msg = Msg::open(store, &DecodeConfig::default(), &sink).unwrap();
    let summary = MessageSummary::new(&msg);
    assert_eq!(summary.n_attachments, 1);
    assert_eq!(summary.embedded.len(), 1);

    let json = summary.to_json().unwrap();
    assert_eq!(json["kind"], json!("Plain"));
    assert_eq!(
        json["headers"],
        json!([
            ["from", "Bob <bob@example.com>"],
            ["subject", "Report continued"],
            ["message-id", "<1@example.com>"],
        ])
    );
    assert_eq!(json["from"], json!("<bob@example.com>"));
    assert_eq!(
        json["recipients"],
        json!([{"kind": "Bcc", "name": "Carol", "email": null}])
    );
    assert_eq!(json["attachments_by_ref"], json!(["\\\\server\\share\\file.doc"]));
    assert_eq!(json["has_text_body"], json!(true));
    assert_eq!(json["has_rtf_body"], json!(true));
    assert_eq!(json["has_html_body"], json!(false));
    assert_eq!(json["is_embedded"], json!(false));
    assert_eq!(json["attachments"][0]["name"], json!("report.pdf"));
    assert_eq!(json["attachments"][0]["size"], json!(8));
    assert_eq!(json["attachments"][2]["method"], json!("EmbeddedMessage"));
    assert!(json["attachments"][3]["broken"].is_string());
    assert_eq!(json["embedded"][0]["is_embedded"], json!(true));
    assert_eq!(
        json["embedded"][0]["header_block"][0]["fields"][5],
        json!(["Subject", "Inner"])
    );
    assert_eq!(
        json["symbols"],
        json!(["MSG_TEXT_BODY", "MSG_RTF_BODY", "BROKEN_ATTACHMENT"])
    );
}
