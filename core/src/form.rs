//! Two-step create/edit form for a todo.
//!
//! Step one holds the details (title, description, due date, tags), step two
//! the assignment (status, user, priority). Validation is purely local: a
//! form with errors never reaches the backend.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

use crate::error::ApiError;
use crate::todos::TodoCollection;
use crate::transport::Transport;
use crate::types::{NewTodo, Todo, TodoId, TodoPatch, TodoPriority, TodoStatus};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Title,
    Description,
    DueDate,
    Tags,
    Status,
    AssignedUser,
    Priority,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::DueDate => "dueDate",
            Field::Tags => "tags",
            Field::Status => "status",
            Field::AssignedUser => "assignedUser",
            Field::Priority => "priority",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Details,
    Assignment,
}

/// Field-level validation failures, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("invalid form: {}", summarize(.0))]
pub struct ValidationErrors(pub BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Raw form input, as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoDraft {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub tags: Vec<String>,
    pub status: TodoStatus,
    pub assigned_user: Option<u64>,
    pub priority: Option<TodoPriority>,
}

impl Default for TodoDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            due_date: String::new(),
            tags: Vec::new(),
            status: TodoStatus::Todo,
            assigned_user: None,
            priority: Some(TodoPriority::Low),
        }
    }
}

impl From<&Todo> for TodoDraft {
    fn from(todo: &Todo) -> Self {
        Self {
            title: todo.title.clone(),
            description: todo.description.clone(),
            due_date: todo.due_date.format(DATE_FORMAT).to_string(),
            tags: todo.tags.clone().unwrap_or_default(),
            status: todo.status,
            assigned_user: Some(todo.assigned_user),
            priority: Some(todo.priority),
        }
    }
}

#[derive(Debug, Clone)]
enum Mode {
    Create,
    Edit { id: TodoId, original: NewTodo },
}

#[derive(Debug, Clone)]
pub struct TaskForm {
    mode: Mode,
    step: Step,
    draft: TodoDraft,
    errors: BTreeMap<Field, String>,
}

impl TaskForm {
    pub fn create() -> Self {
        Self {
            mode: Mode::Create,
            step: Step::Details,
            draft: TodoDraft::default(),
            errors: BTreeMap::new(),
        }
    }

    pub fn edit(todo: &Todo) -> Self {
        Self {
            mode: Mode::Edit {
                id: todo.id.clone(),
                original: NewTodo::from(todo),
            },
            step: Step::Details,
            draft: TodoDraft::from(todo),
            errors: BTreeMap::new(),
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, Mode::Edit { .. })
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn draft(&self) -> &TodoDraft {
        &self.draft
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn errors(&self) -> ValidationErrors {
        ValidationErrors(self.errors.clone())
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
        self.errors.remove(&Field::Title);
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.description = description.into();
        self.errors.remove(&Field::Description);
    }

    pub fn set_due_date(&mut self, due_date: impl Into<String>) {
        self.draft.due_date = due_date.into();
        self.errors.remove(&Field::DueDate);
    }

    /// Trims, drops blanks and keeps the first occurrence of each tag.
    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cleaned: Vec<String> = Vec::new();
        for tag in tags {
            let tag = tag.as_ref().trim();
            if !tag.is_empty() && !cleaned.iter().any(|t| t == tag) {
                cleaned.push(tag.to_string());
            }
        }
        self.draft.tags = cleaned;
        self.errors.remove(&Field::Tags);
    }

    pub fn set_status(&mut self, status: TodoStatus) {
        self.draft.status = status;
        self.errors.remove(&Field::Status);
    }

    pub fn set_assigned_user(&mut self, user: Option<u64>) {
        self.draft.assigned_user = user;
        self.errors.remove(&Field::AssignedUser);
    }

    pub fn set_priority(&mut self, priority: Option<TodoPriority>) {
        self.draft.priority = priority;
        self.errors.remove(&Field::Priority);
    }

    /// Advances to the assignment step if the details validate.
    pub fn next(&mut self) -> bool {
        if self.step == Step::Details && self.validate_step() {
            self.step = Step::Assignment;
            return true;
        }
        false
    }

    pub fn back(&mut self) {
        self.step = Step::Details;
    }

    /// Validates the current step only, replacing the error set.
    pub fn validate_step(&mut self) -> bool {
        self.errors = match self.step {
            Step::Details => details_errors(&self.draft),
            Step::Assignment => assignment_errors(&self.draft),
        };
        self.errors.is_empty()
    }

    /// Validates both steps and produces the payload. On failure the form
    /// moves to the first step that has errors.
    pub fn build(&mut self) -> Result<NewTodo, ValidationErrors> {
        let details = details_errors(&self.draft);
        if !details.is_empty() {
            self.step = Step::Details;
        }
        let mut errors = details;
        errors.extend(assignment_errors(&self.draft));
        self.errors = errors.clone();

        match (
            parse_date(&self.draft.due_date),
            self.draft.assigned_user,
            self.draft.priority,
        ) {
            (Some(due_date), Some(assigned_user), Some(priority)) if errors.is_empty() => {
                Ok(NewTodo {
                    title: self.draft.title.trim().to_string(),
                    description: self.draft.description.clone(),
                    due_date,
                    status: self.draft.status,
                    assigned_user,
                    priority,
                    tags: self.tags_value(),
                })
            }
            _ => Err(ValidationErrors(errors)),
        }
    }

    /// Creates or patches the todo through `todos`. An edit with no changes
    /// does not contact the backend.
    pub async fn submit<T: Transport>(
        &mut self,
        todos: &TodoCollection<T>,
    ) -> Result<Todo, SubmitError> {
        let payload = self.build()?;
        match &self.mode {
            Mode::Create => Ok(todos.create(&payload).await?),
            Mode::Edit { id, original } => {
                let patch = TodoPatch::between(original, &payload);
                if patch.is_empty() {
                    return Ok(with_id(id.clone(), payload));
                }
                Ok(todos.update(id, &patch).await?)
            }
        }
    }

    /// An empty tag list is sent as absent, unless the record being edited
    /// already had an explicit empty list.
    fn tags_value(&self) -> Option<Vec<String>> {
        if !self.draft.tags.is_empty() {
            return Some(self.draft.tags.clone());
        }
        match &self.mode {
            Mode::Edit { original, .. } if original.tags.as_ref().is_some_and(Vec::is_empty) => {
                Some(Vec::new())
            }
            _ => None,
        }
    }
}

fn summarize(errors: &BTreeMap<Field, String>) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn with_id(id: TodoId, todo: NewTodo) -> Todo {
    Todo {
        id,
        title: todo.title,
        description: todo.description,
        due_date: todo.due_date,
        status: todo.status,
        assigned_user: todo.assigned_user,
        priority: todo.priority,
        tags: todo.tags,
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

fn details_errors(draft: &TodoDraft) -> BTreeMap<Field, String> {
    let mut errors = BTreeMap::new();
    if draft.title.trim().is_empty() {
        errors.insert(Field::Title, "Title is required".to_string());
    }
    if draft.due_date.trim().is_empty() {
        errors.insert(Field::DueDate, "Due Date is required".to_string());
    } else if parse_date(&draft.due_date).is_none() {
        errors.insert(
            Field::DueDate,
            "Due Date must be a valid date (YYYY-MM-DD)".to_string(),
        );
    }
    errors
}

fn assignment_errors(draft: &TodoDraft) -> BTreeMap<Field, String> {
    let mut errors = BTreeMap::new();
    if draft.assigned_user.is_none() {
        errors.insert(Field::AssignedUser, "Assigned User is required".to_string());
    }
    if draft.priority.is_none() {
        errors.insert(Field::Priority, "Priority is required".to_string());
    }
    errors
}
