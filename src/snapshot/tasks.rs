use serde::Serialize;

use crate::domain::clock::card_time;
use crate::domain::roster::COORDINATOR;
use crate::domain::{Clock, Task, TaskStatus};

const KANBAN_LIMIT: usize = 100;
const APPROVAL_TAGS: [&str; 2] = ["approval", "needs_approval"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub queued: usize,
    pub running: usize,
    pub blocked: usize,
    pub succeeded_today: usize,
    pub failed_today: usize,
}

/// Open critical-priority item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct P0Item {
    #[serde(rename = "i")]
    pub title: String,
    #[serde(rename = "o")]
    pub owner: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingApproval {
    pub id: Option<String>,
    pub title: String,
    pub agent: String,
    pub status: String,
    pub age_hours: Option<i64>,
}

/// Card on the kanban board, with display defaults filled in
#[derive(Debug, Clone, Serialize)]
pub struct KanbanTask {
    pub id: Option<String>,
    pub title: Option<String>,
    pub agent: String,
    pub product: String,
    pub priority: String,
    pub status: String,
    pub created: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Optimization {
    pub total: usize,
    pub done: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TaskReport {
    pub summary: TaskSummary,
    pub p0: Vec<P0Item>,
    pub pending_approvals: Vec<PendingApproval>,
    pub kanban: Vec<KanbanTask>,
    pub optimization: Optimization,
}

pub fn is_p0(task: &Task) -> bool {
    task.is_critical() && !task.is_closed()
}

pub fn needs_approval(task: &Task) -> bool {
    if task.is_closed() {
        return false;
    }
    task.has_status(&TaskStatus::Blocked)
        || task.is_critical()
        || APPROVAL_TAGS.iter().any(|tag| task.has_tag(tag))
}

fn status_label(task: &Task) -> &str {
    task.status.as_ref().map(TaskStatus::as_str).unwrap_or("queued")
}

pub fn summarize(tasks: &[Task], clock: &Clock) -> TaskSummary {
    let count = |status: TaskStatus| tasks.iter().filter(|t| t.has_status(&status)).count();
    let count_today = |status: TaskStatus| {
        tasks
            .iter()
            .filter(|t| clock.is_today(t.created_at.as_deref()) && t.has_status(&status))
            .count()
    };

    TaskSummary {
        queued: count(TaskStatus::Queued),
        running: count(TaskStatus::Running),
        blocked: count(TaskStatus::Blocked),
        succeeded_today: count_today(TaskStatus::Succeeded),
        failed_today: count_today(TaskStatus::Failed),
    }
}

fn kanban_card(task: &Task) -> KanbanTask {
    KanbanTask {
        id: task.id.clone(),
        title: task.title.clone(),
        agent: task
            .assigned_agent
            .clone()
            .unwrap_or_else(|| COORDINATOR.to_string()),
        product: task.product.clone().unwrap_or_else(|| "factory".to_string()),
        priority: task.priority.clone().unwrap_or_else(|| "normal".to_string()),
        status: status_label(task).to_string(),
        created: task
            .created_at
            .as_deref()
            .and_then(card_time)
            .unwrap_or_else(|| "—".to_string()),
    }
}

pub fn aggregate(tasks: &[Task], clock: &Clock) -> TaskReport {
    let p0 = tasks
        .iter()
        .filter(|t| is_p0(t))
        .map(|t| P0Item {
            title: t.title_or_untitled().to_string(),
            owner: t
                .assigned_agent
                .clone()
                .unwrap_or_else(|| "unassigned".to_string()),
        })
        .collect();

    let pending_approvals = tasks
        .iter()
        .filter(|t| needs_approval(t))
        .map(|t| PendingApproval {
            id: t.id.clone(),
            title: t.title_or_untitled().to_string(),
            agent: t
                .assigned_agent
                .clone()
                .unwrap_or_else(|| "unassigned".to_string()),
            status: status_label(t).to_string(),
            age_hours: clock.hours_since(t.created_at.as_deref()),
        })
        .collect();

    let optimization_tasks: Vec<&Task> = tasks.iter().filter(|t| t.has_tag("optimization")).collect();

    TaskReport {
        summary: summarize(tasks, clock),
        p0,
        pending_approvals,
        kanban: tasks.iter().take(KANBAN_LIMIT).map(kanban_card).collect(),
        optimization: Optimization {
            total: optimization_tasks.len(),
            done: optimization_tasks
                .iter()
                .filter(|t| t.has_status(&TaskStatus::Succeeded))
                .count(),
        },
    }
}
