//! Resource methods, one module per api resource.
//!
//! Simple lookups are plain `async fn`s on [`Client`](crate::Client). Calls with many optional
//! fields start a builder on the client and finish with `.build().send().await`:
//!
//! ```rust,ignore
//! let resp = client
//!     .send_template()
//!     .template("welcome")
//!     .email("praj@sailthru.com")
//!     .build()
//!     .send()
//!     .await?;
//! ```

mod alert;
pub use alert::{AlertType, SaveAlert, SaveAlertBuilder};

mod blast;
pub use blast::{
    ScheduleBlast, ScheduleBlastBuilder, ScheduleBlastFromBlast, ScheduleBlastFromBlastBuilder,
    ScheduleBlastFromTemplate, ScheduleBlastFromTemplateBuilder, UpdateBlast, UpdateBlastBuilder,
};

mod contacts;

mod content;
pub use content::{PushContent, PushContentBuilder};

mod email;
pub use email::{SetEmail, SetEmailBuilder};

mod list;

mod purchase;
pub use purchase::{Purchase, PurchaseBuilder, PurchaseKey, verify_purchase_items};

mod send;
pub use send::{MultiSend, MultiSendBuilder, SendTemplate, SendTemplateBuilder};

mod stats;
pub use stats::{StatsBlast, StatsBlastBuilder, StatsList, StatsListBuilder, StatsSend, StatsSendBuilder};

mod template;

mod user;
pub use user::{GetUser, GetUserBuilder, SaveUser, SaveUserBuilder};

use serde::Serializer;

fn join_with_comma<S>(items: &[&str], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&items.join(","))
}

fn bool_as_int<S>(b: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u8(u8::from(*b))
}
