use std::fs::File;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use schoolhub::history::{HistoryImport, parse_history_csv};
use schoolhub::model::entity::{
    Group, GroupCreate, GroupHistory, GroupHistoryCreate, Lesson, LessonCreate, ROLE_ADMIN,
    ROLE_STUDENT, ROLE_TEACHER, Student, StudentCreate, Teacher, TeacherCreate, UserEntity,
    UserEntityCreate,
};
use schoolhub::model::{DbConnection, ModelManager, Repository};
use schoolhub::web::AuthenticatedUser;

#[derive(Parser, Debug)]
#[command(about = "CLI tool for filling the school DB", long_about = None)]
pub struct Cli {
    /// Overrides `DATABASE_URL` and the configured database
    #[arg(long, global = true)]
    pub database: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage teachers
    Teacher {
        #[command(subcommand)]
        action: TeacherCommands,
    },

    /// Manage groups
    Group {
        #[command(subcommand)]
        action: GroupCommands,
    },

    /// Manage students
    Student {
        #[command(subcommand)]
        action: StudentCommands,
    },

    /// Manage lessons
    Lesson {
        #[command(subcommand)]
        action: LessonCommands,
    },

    /// Group history
    History {
        #[command(subcommand)]
        action: HistoryCommands,
    },
}

/// User management
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Add {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        /// admin, teacher or student
        #[arg(long, default_value = "admin")]
        role: String,
    },
}

/// Teacher management
#[derive(Subcommand, Debug)]
pub enum TeacherCommands {
    Add {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: Option<String>,
        /// Existing account with the `teacher` role to link
        #[arg(long)]
        username: Option<String>,
    },
}

/// Group management
#[derive(Subcommand, Debug)]
pub enum GroupCommands {
    Add {
        /// Group label, e.g. 1, 2.1
        #[arg(long)]
        number: f64,
        #[arg(long)]
        teacher_id: Option<uuid::Uuid>,
        #[arg(long)]
        description: Option<String>,
        /// Chart colour, e.g. #bd2e8d
        #[arg(long)]
        color: Option<String>,
    },
}

/// Student management
#[derive(Subcommand, Debug)]
pub enum StudentCommands {
    Add {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        class_name: Option<String>,
        /// Initial group number
        #[arg(long)]
        group: Option<f64>,
        /// Date of the initial group entry, defaults to today
        #[arg(long)]
        since: Option<NaiveDate>,
    },
}

/// Lesson management
#[derive(Subcommand, Debug)]
pub enum LessonCommands {
    Add {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        title: String,
        /// Path to a Markdown file with lesson content
        #[arg(long)]
        file: String,
        #[arg(long)]
        theory_minutes: Option<i32>,
        #[arg(long)]
        practice_minutes: Option<i32>,
        /// mixed_fractions or comparison
        #[arg(long)]
        curriculum: Option<String>,
    },
}

/// History import
#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    Import {
        /// CSV with `name`, `class` and one ISO-dated column per period
        #[arg(long)]
        file: String,
        /// Drop the existing history first
        #[arg(long, default_value_t = false)]
        replace: bool,
    },
}

async fn database_uri(arg: Option<String>) -> String {
    if let Some(uri) = arg.or_else(|| std::env::var("DATABASE_URL").ok()) {
        return uri;
    }
    schoolhub::Config::get_or_init(cfg!(debug_assertions))
        .await
        .app()
        .database_uri()
        .to_string()
}

#[tokio::main]
async fn main() -> schoolhub::error::AppResult<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let db_con = DbConnection::connect(&database_uri(args.database).await)?;
    db_con.migrate().await?;
    let mm = ModelManager::new(db_con);
    let actor = AuthenticatedUser::admin();
    let today = Utc::now().date_naive();

    match args.command {
        Commands::User { action } => match action {
            UserCommands::Add {
                username,
                password,
                role,
            } => {
                if ![ROLE_ADMIN, ROLE_TEACHER, ROLE_STUDENT].contains(&role.as_str()) {
                    eprintln!("unknown role '{role}'");
                    std::process::exit(2);
                }

                let user = UserEntity::create(
                    &mm,
                    &actor,
                    UserEntityCreate {
                        username,
                        password_hash: schoolhub::auth::hash_password(&password)?,
                        role,
                    },
                )
                .await?;
                println!("User created: {:?}", user);
            }
        },

        Commands::Teacher { action } => match action {
            TeacherCommands::Add {
                full_name,
                email,
                username,
            } => {
                let user_id = match username {
                    Some(username) => {
                        let user = UserEntity::find_by_username(&mm, &actor, &username).await?;
                        match user {
                            Some(user) => Some(user.id()),
                            None => {
                                eprintln!("user '{username}' not found");
                                std::process::exit(2);
                            }
                        }
                    }
                    None => None,
                };

                let teacher = Teacher::create(
                    &mm,
                    &actor,
                    TeacherCreate {
                        user_id,
                        full_name,
                        email,
                    },
                )
                .await?;
                println!("Teacher created: {:?}", teacher);
            }
        },

        Commands::Group { action } => match action {
            GroupCommands::Add {
                number,
                teacher_id,
                description,
                color,
            } => {
                let group = Group::create(
                    &mm,
                    &actor,
                    GroupCreate {
                        number,
                        teacher_id,
                        description,
                        color,
                    },
                )
                .await?;
                println!("{group} created: {:?}", group);
            }
        },

        Commands::Student { action } => match action {
            StudentCommands::Add {
                full_name,
                class_name,
                group,
                since,
            } => {
                let student = Student::create(
                    &mm,
                    &actor,
                    StudentCreate {
                        full_name,
                        class_name,
                    },
                )
                .await?;

                if let Some(number) = group {
                    let Some(group) = Group::find_by_number(&mm, &actor, number).await? else {
                        eprintln!("group {number} not found");
                        std::process::exit(2);
                    };
                    GroupHistory::record_transfer(
                        &mm,
                        &actor,
                        GroupHistoryCreate {
                            student_id: student.id(),
                            group_id: group.id(),
                            transfer_date: since.unwrap_or(today),
                            reason: String::from("enrolled"),
                        },
                    )
                    .await?;
                }
                println!("Student created: {:?}", student);
            }
        },

        Commands::Lesson { action } => match action {
            LessonCommands::Add {
                date,
                title,
                file,
                theory_minutes,
                practice_minutes,
                curriculum,
            } => {
                let content = std::fs::read_to_string(file)?;
                let lesson = Lesson::create(
                    &mm,
                    &actor,
                    LessonCreate {
                        lesson_date: date,
                        title,
                        content,
                        theory_minutes,
                        practice_minutes,
                        curriculum,
                    },
                )
                .await?;
                println!("Lesson created: {:?}", lesson);
            }
        },

        Commands::History { action } => match action {
            HistoryCommands::Import { file, replace } => {
                let parsed = parse_history_csv(File::open(file)?)?;
                let report = HistoryImport::run(&mm, &actor, &parsed, replace).await?;

                println!("Inserted {} history entries", report.inserted);
                for error in &report.errors {
                    println!("  {error}");
                }
                if !report.is_clean() {
                    std::process::exit(1);
                }
            }
        },
    }

    Ok(())
}
