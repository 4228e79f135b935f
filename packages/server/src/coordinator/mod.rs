//! Coordinator 層
//!
//! レジストリと論理クロックの唯一の所有者。レジストリへの変更と
//! ブロードキャストはすべてこのモジュールのアトミックな操作を通して行われ、
//! 他のコンポーネントがクロックやマップに直接触れることはありません。

mod error;
mod registry;
mod report;

pub use error::CoordinatorError;
pub use registry::{Coordinator, JoinOutcome, ParticipantSnapshot};
pub use report::{BroadcastReport, Delivery, DeliveryError};
