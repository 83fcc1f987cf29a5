pub mod category;
pub mod natural_key;
pub mod observation;
pub mod payload;
pub mod record_id;
pub mod remote_id;
pub mod sync_state;
pub mod tour_id;

pub use category::RecordCategory;
pub use natural_key::NaturalKey;
pub use observation::{ObservationStatus, ResponseValue, Severity};
pub use payload::RecordPayload;
pub use record_id::PendingRecordId;
pub use remote_id::RemoteId;
pub use sync_state::SyncState;
pub use tour_id::TourId;
