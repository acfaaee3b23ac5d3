use super::{BaseMessage, HeaderBlock, Message, MessageKind};
use crate::enums::{TaskAcceptance, TaskHistory, TaskMode, TaskOwnership, TaskStatus};
use crate::named::PropertySet;
use crate::record::PropertyValue;
use crate::tags::*;
use once_cell::sync::OnceCell;
use time::OffsetDateTime;

#[derive(Debug)]
/// A task or a task request
pub struct Task {
    base: BaseMessage,
    header: OnceCell<HeaderBlock>,
}

impl Task {
    pub(crate) fn new(base: BaseMessage) -> Self {
        Self {
            base,
            header: OnceCell::new(),
        }
    }

    fn task_prop(&self, lid: u32) -> Option<&PropertyValue> {
        self.properties().named(PropertySet::Task, lid)
    }

    /// The task status
    pub fn status(&self) -> Option<TaskStatus> {
        TaskStatus::from_int(self.task_prop(PID_LID_TASK_STATUS)?.as_int()?)
    }

    /// Completion, between 0.0 and 1.0
    pub fn percent_complete(&self) -> Option<f64> {
        self.task_prop(PID_LID_PERCENT_COMPLETE)?.as_float()
    }

    /// Whether the task is complete
    pub fn complete(&self) -> bool {
        self.task_prop(PID_LID_TASK_COMPLETE)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    /// Start date
    pub fn start_date(&self) -> Option<&OffsetDateTime> {
        self.task_prop(PID_LID_TASK_START_DATE)?.as_time()
    }

    /// Due date
    pub fn due_date(&self) -> Option<&OffsetDateTime> {
        self.task_prop(PID_LID_TASK_DUE_DATE)?.as_time()
    }

    /// Completion date
    pub fn date_completed(&self) -> Option<&OffsetDateTime> {
        self.task_prop(PID_LID_TASK_DATE_COMPLETED)?.as_time()
    }

    /// The task owner
    pub fn owner(&self) -> Option<&str> {
        self.task_prop(PID_LID_TASK_OWNER)?.as_str()
    }

    /// Who assigned the task
    pub fn assigner(&self) -> Option<&str> {
        self.task_prop(PID_LID_TASK_ASSIGNER)?.as_str()
    }

    /// Last change to the task
    pub fn history(&self) -> Option<TaskHistory> {
        TaskHistory::from_int(self.task_prop(PID_LID_TASK_HISTORY)?.as_int()?)
    }

    /// Role of the user relative to the task
    pub fn ownership(&self) -> Option<TaskOwnership> {
        TaskOwnership::from_int(self.task_prop(PID_LID_TASK_OWNERSHIP)?.as_int()?)
    }

    /// Acceptance state of an assigned task
    pub fn acceptance(&self) -> Option<TaskAcceptance> {
        TaskAcceptance::from_int(self.task_prop(PID_LID_TASK_ACCEPTANCE_STATE)?.as_int()?)
    }

    /// The task mode
    pub fn mode(&self) -> Option<TaskMode> {
        TaskMode::from_int(
            self.properties()
                .named(PropertySet::Common, PID_LID_TASK_MODE)?
                .as_int()?,
        )
    }
}

impl Message for Task {
    fn base(&self) -> &BaseMessage {
        &self.base
    }

    fn kind(&self) -> MessageKind {
        MessageKind::Task
    }

    fn header_block(&self) -> &HeaderBlock {
        self.header.get_or_init(|| {
            let date = |t: Option<&OffsetDateTime>| t.map(|t| self.base.format_date(t));
            HeaderBlock::default()
                .section(
                    "-main info-",
                    vec![
                        ("Subject", self.subject().map(String::from)),
                        ("Status", self.status().map(|s| s.to_string())),
                        (
                            "Percent Complete",
                            self.percent_complete()
                                .map(|p| format!("{}%", (p * 100.0).round())),
                        ),
                    ],
                )
                .section(
                    "-date-",
                    vec![
                        ("Start Date", date(self.start_date())),
                        ("Due Date", date(self.due_date())),
                        ("Date Completed", date(self.date_completed())),
                    ],
                )
                .section(
                    "-people-",
                    vec![
                        ("Owner", self.owner().map(String::from)),
                        ("Assigner", self.assigner().map(String::from)),
                    ],
                )
        })
    }
}
