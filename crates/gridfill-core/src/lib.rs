//! gridfill-core - cell model, autofill and the session that keeps the
//! model, the grid surface, the formula engine and storage in sync.

pub mod autofill;
pub mod error;
pub mod model;
pub mod session;
pub mod snapshot;
pub mod storage;
pub mod surface;

pub use autofill::{AutofillDecision, AutofillRequest, FillValue, RejectReason};
pub use error::{GridfillError, Result};
pub use model::{Cell, CellValue, Grid};
pub use session::{CellInput, GridChange, Session, SessionConfig, SubmitOutcome};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use surface::{DisplayBuffer, GridSurface};

pub use gridfill_engine::{CellRef, EngineError, Workbook};
