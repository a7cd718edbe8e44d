use crate::adapters::LocalStorage;
use crate::app::render::{self, OutputFormat};
use crate::app::workflow::AllotmentWorkflow;
use crate::config::cli::Command;
use crate::core::dispatcher::DeleteOutcome;
use crate::core::session::{AuthService, Session};
use crate::domain::model::{NewCourse, ReportScope};
use crate::domain::ports::{Backend, Confirmer};
use crate::utils::error::Result;
use std::io::Write;
use std::sync::Arc;

/// 執行單一子命令，結果寫到 `out`
pub async fn execute<B, C, W>(
    command: &Command,
    workflow: &mut AllotmentWorkflow<B, C>,
    format: OutputFormat,
    out: &mut W,
) -> Result<()>
where
    B: Backend + Clone,
    C: Confirmer,
    W: Write,
{
    match command {
        Command::Teachers { search } => {
            workflow.load_teachers().await?;
            let listing = workflow.teachers();
            listing.set_search(search.as_str());
            let view = listing.view();
            render::render(out, view.iter(), format)?;
            summary(out, format, view.len(), view.total(), "teachers")?;
        }
        Command::Courses { search } => {
            workflow.load_courses().await?;
            let listing = workflow.courses();
            listing.set_search(search.as_str());
            let view = listing.view();
            render::render(out, view.iter(), format)?;
            summary(out, format, view.len(), view.total(), "courses")?;
        }
        Command::Allotments { search, expand } => {
            workflow.load_allotments().await?;
            let listing = workflow.allotments();
            listing.set_search(search.as_str());
            let view = listing.view();
            if *expand && format == OutputFormat::Table {
                render::render_allotment_details(out, view.iter())?;
            } else {
                render::render(out, view.iter(), format)?;
            }
            summary(out, format, view.len(), view.total(), "allotments")?;
        }
        Command::AddCourse { name, code, hours } => {
            let course = NewCourse {
                course_name: name.trim().to_string(),
                course_code: code.trim().to_string(),
                hours: *hours,
            };
            workflow.create_course(&course).await?;
            writeln!(out, "✅ Course registered successfully!")?;
        }
        Command::Assign { teacher, courses } | Command::Reassign { teacher, courses } => {
            workflow.load_assignment_form().await?;
            workflow.select_teacher(teacher)?;
            for id in courses {
                workflow.add_course(*id)?;
            }
            let selected = workflow.selected_courses();

            let response = if matches!(command, Command::Reassign { .. }) {
                workflow.reassign().await?
            } else {
                workflow.submit().await?
            };
            let message = if response.message.is_empty() {
                "Courses assigned successfully!".to_string()
            } else {
                response.message
            };
            writeln!(out, "✅ {}", message)?;
            for course in selected {
                writeln!(out, "    {} ({}) - {} hrs", course.name, course.code, course.hours)?;
            }
        }
        Command::DeleteCourse { id } => {
            workflow.load_courses().await?;
            let outcome = workflow.delete_course(*id).await?;
            report_delete(out, &outcome, &format!("Course {}", id))?;
        }
        Command::DeleteAllotment { email } => {
            workflow.load_allotments().await?;
            let outcome = workflow.delete_allotment(email).await?;
            report_delete(out, &outcome, &format!("Allotments for {}", email))?;
        }
        Command::Download { teacher, out: dir } => {
            let scope = match teacher {
                Some(email) => ReportScope::Teacher(email.clone()),
                None => ReportScope::All,
            };
            let storage = LocalStorage::new(dir.clone());
            let path = workflow.download_report(&scope, &storage).await?;
            writeln!(out, "📄 {}", path)?;
        }
        Command::Details { email, password } => {
            let auth = AuthService::new(workflow.backend().clone(), Arc::new(Session::new()));
            auth.login(email, password).await?;
            let details = auth.my_details().await?;
            render::render_teacher_details(out, &details)?;
            auth.logout();
        }
        Command::ResetPassword {
            email,
            token,
            password,
            confirm,
        } => {
            let auth = AuthService::new(workflow.backend().clone(), Arc::new(Session::new()));
            auth.reset_password(email, token, password, confirm).await?;
            writeln!(out, "✅ Password has been reset. You can now log in.")?;
        }
    }
    Ok(())
}

/// CSV 輸出保持純資料，不附加摘要列
fn summary<W: Write>(
    out: &mut W,
    format: OutputFormat,
    shown: usize,
    total: usize,
    noun: &str,
) -> Result<()> {
    if format == OutputFormat::Table {
        writeln!(out, "\n{}", render::summary_line(shown, total, noun))?;
    }
    Ok(())
}

fn report_delete<W: Write>(out: &mut W, outcome: &DeleteOutcome, what: &str) -> Result<()> {
    match outcome {
        DeleteOutcome::Deleted { .. } => writeln!(out, "🗑️ {} deleted.", what)?,
        DeleteOutcome::Cancelled => writeln!(out, "Cancelled.")?,
        DeleteOutcome::AlreadyInFlight => writeln!(out, "{} is already being deleted.", what)?,
    }
    Ok(())
}
