mod user;
pub use user::{ROLE_ADMIN, ROLE_STUDENT, ROLE_TEACHER, UserEntity, UserEntityCreate};

mod teacher;
pub use teacher::{Teacher, TeacherCreate};

mod group;
pub use group::{Group, GroupCreate, GroupWithCountRow};

mod student;
pub use student::{Student, StudentCreate, StudentWithGroupRow};

mod group_history;
pub use group_history::{GroupHistory, GroupHistoryCreate};

mod lesson;
pub use lesson::{Lesson, LessonCreate};

mod lesson_task;
pub use lesson_task::{LessonTask, LessonTaskState};

mod assignment;
pub use assignment::{Assignment, AssignmentCreate};

mod submission;
pub use submission::{MAX_SUBMISSION_GRADE, Submission, SubmissionCreate};
