//! Serialize an `XunitReport` as xUnit XML.

use super::{Outcome, TestCase, XunitReport};
use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Writer,
};
use std::{borrow::Cow, io, time::Duration};

static TESTSUITE_TAG: &str = "testsuite";
static TESTCASE_TAG: &str = "testcase";
static ERROR_TAG: &str = "error";
static SKIPPED_TAG: &str = "skipped";

pub(super) fn write_report(report: &XunitReport, writer: impl io::Write) -> quick_xml::Result<()> {
    let mut writer = Writer::new_with_indent(writer, b' ', 4);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut suite_tag = BytesStart::new(TESTSUITE_TAG);
    suite_tag.extend_attributes([
        ("name", &*printable(report.name())),
        ("tests", report.total().to_string().as_str()),
        ("errors", report.errors().to_string().as_str()),
        ("failures", report.failures().to_string().as_str()),
        ("skip", report.skipped().to_string().as_str()),
    ]);
    writer.write_event(Event::Start(suite_tag))?;

    for testcase in report.testcases() {
        write_testcase(testcase, &mut writer)?;
    }

    writer.write_event(Event::End(BytesEnd::new(TESTSUITE_TAG)))?;
    Ok(())
}

fn write_testcase(testcase: &TestCase, writer: &mut Writer<impl io::Write>) -> quick_xml::Result<()> {
    let mut tag = BytesStart::new(TESTCASE_TAG);
    tag.extend_attributes([
        ("classname", &*printable(testcase.classname())),
        ("name", &*printable(testcase.name())),
        ("time", serialize_time(testcase.time()).as_str()),
    ]);

    match testcase.outcome() {
        Outcome::Ok => writer.write_event(Event::Empty(tag)),
        Outcome::Failure { message, details } | Outcome::Error { message, details } => {
            writer.write_event(Event::Start(tag))?;

            let mut error_tag = BytesStart::new(ERROR_TAG);
            error_tag.extend_attributes([
                ("type", &*printable(testcase.name())),
                ("message", &*printable(message)),
            ]);
            writer.write_event(Event::Start(error_tag))?;
            writer.write_event(Event::Text(BytesText::new(&printable(details))))?;
            writer.write_event(Event::End(BytesEnd::new(ERROR_TAG)))?;

            writer.write_event(Event::End(BytesEnd::new(TESTCASE_TAG)))
        }
        Outcome::Skip => {
            writer.write_event(Event::Start(tag))?;
            writer.write_event(Event::Empty(BytesStart::new(SKIPPED_TAG)))?;
            writer.write_event(Event::End(BytesEnd::new(TESTCASE_TAG)))
        }
    }
}

/// Drop control characters XML 1.0 does not allow. Tab, newline and
/// carriage return are kept.
fn printable(text: &str) -> Cow<'_, str> {
    let forbidden = |c: char| matches!(c, '\x00'..='\x08' | '\x0b' | '\x0c' | '\x0e'..='\x1f');
    if text.contains(forbidden) {
        Cow::Owned(text.replace(forbidden, ""))
    } else {
        Cow::Borrowed(text)
    }
}

// Seconds with 3 decimal places.
fn serialize_time(time: Duration) -> String {
    format!("{:.3}", time.as_secs_f64())
}
