use crate::app::render::OutputFormat;
use clap::{Parser, Subcommand};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "tca-admin")]
#[command(about = "Manage teachers, courses and course allotments")]
pub struct Cli {
    /// Path to TOML configuration file (defaults to ./tca-admin.toml, then TCA_BASE_URL)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overrides the configuration
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Answer yes to every confirmation prompt
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Subcommand)]
pub enum Command {
    /// List registered teachers
    Teachers {
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// List the course catalog
    Courses {
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// List every teacher's allotment with total hours
    Allotments {
        #[arg(short, long, default_value = "")]
        search: String,
        /// Show each teacher's courses
        #[arg(long)]
        expand: bool,
    },
    /// Register a new course
    AddCourse {
        #[arg(long)]
        name: String,
        #[arg(long)]
        code: String,
        #[arg(long, default_value_t = 0)]
        hours: u32,
    },
    /// Assign courses to a teacher (merged with existing ones)
    Assign {
        #[arg(short, long)]
        teacher: String,
        #[arg(short = 'C', long = "course", value_delimiter = ',')]
        courses: Vec<i64>,
    },
    /// Replace a teacher's courses with exactly the given set
    Reassign {
        #[arg(short, long)]
        teacher: String,
        #[arg(short = 'C', long = "course", value_delimiter = ',')]
        courses: Vec<i64>,
    },
    /// Delete a course by id
    DeleteCourse { id: i64 },
    /// Delete all allotments of one teacher
    DeleteAllotment { email: String },
    /// Download the allotment PDF report
    Download {
        /// Only this teacher's report
        #[arg(short, long)]
        teacher: Option<String>,
        #[arg(short, long, default_value = ".")]
        out: String,
    },
    /// Log in as a teacher and show the assigned courses
    Details {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Set a new password with a reset token
    ResetPassword {
        #[arg(long)]
        email: String,
        #[arg(long)]
        token: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
    },
}

const REDACTED: &str = "***";

/// 密碼與 token 不可出現在 `-v` 的除錯日誌中
impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Teachers { search } => f.debug_struct("Teachers").field("search", search).finish(),
            Self::Courses { search } => f.debug_struct("Courses").field("search", search).finish(),
            Self::Allotments { search, expand } => f
                .debug_struct("Allotments")
                .field("search", search)
                .field("expand", expand)
                .finish(),
            Self::AddCourse { name, code, hours } => f
                .debug_struct("AddCourse")
                .field("name", name)
                .field("code", code)
                .field("hours", hours)
                .finish(),
            Self::Assign { teacher, courses } => f
                .debug_struct("Assign")
                .field("teacher", teacher)
                .field("courses", courses)
                .finish(),
            Self::Reassign { teacher, courses } => f
                .debug_struct("Reassign")
                .field("teacher", teacher)
                .field("courses", courses)
                .finish(),
            Self::DeleteCourse { id } => f.debug_struct("DeleteCourse").field("id", id).finish(),
            Self::DeleteAllotment { email } => {
                f.debug_struct("DeleteAllotment").field("email", email).finish()
            }
            Self::Download { teacher, out } => f
                .debug_struct("Download")
                .field("teacher", teacher)
                .field("out", out)
                .finish(),
            Self::Details { email, .. } => f
                .debug_struct("Details")
                .field("email", email)
                .field("password", &REDACTED)
                .finish(),
            Self::ResetPassword { email, .. } => f
                .debug_struct("ResetPassword")
                .field("email", email)
                .field("token", &REDACTED)
                .field("password", &REDACTED)
                .field("confirm", &REDACTED)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assign_with_course_list() {
        let cli = Cli::parse_from([
            "tca-admin",
            "assign",
            "--teacher",
            "a@x.com",
            "--course",
            "1,2",
            "-C",
            "3",
        ]);
        match cli.command {
            Command::Assign { teacher, courses } => {
                assert_eq!(teacher, "a@x.com");
                assert_eq!(courses, vec![1, 2, 3]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["tca-admin", "courses", "--search", "data", "--format", "csv", "-y"]);
        assert!(cli.yes);
        assert_eq!(cli.format, OutputFormat::Csv);
        assert!(matches!(cli.command, Command::Courses { ref search } if search == "data"));
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let cli = Cli::parse_from([
            "tca-admin",
            "-v",
            "details",
            "--email",
            "a@x.com",
            "--password",
            "hunter2secret",
        ]);
        let logged = format!("CLI args: {:?}", cli);
        assert!(!logged.contains("hunter2secret"));
        assert!(logged.contains("a@x.com"));

        let cli = Cli::parse_from([
            "tca-admin",
            "reset-password",
            "--email",
            "a@x.com",
            "--token",
            "reset-tok-123",
            "--password",
            "new-password-1",
            "--confirm",
            "new-password-1",
        ]);
        let logged = format!("{:?}", cli);
        assert!(!logged.contains("reset-tok-123"));
        assert!(!logged.contains("new-password-1"));
    }
}
