/*!
 * Translation jobs.
 *
 * - `models`: job records, per-file results and edit payloads
 * - `store`: concurrent in-memory job store
 * - `worker`: per-job processing task
 * - `manager`: submission, status, edits, deletion and cleanup
 */

pub use self::manager::JobManager;
pub use self::models::{
    EditEntry, EditableFile, FileEdit, FileStatus, JobStatus, JobSubmission, StagedFile,
    TranslationJob, TranslationResult,
};
pub use self::store::JobStore;
pub use self::worker::JobWorker;

pub mod manager;
pub mod models;
pub mod store;
pub mod worker;
