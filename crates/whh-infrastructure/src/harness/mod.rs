//! Readiness-gated test harness
//!
//! ```text
//! SuiteFixture::start
//!   declare ─► start runtime ─► readiness gate ─► harvest ─► SubjectHost::configure
//!                                                                 │
//!                                                     SubjectHost::start (dill catalog)
//!                                                                 │
//!                                        with_scope / create_scope (chained catalog per test)
//!                                                                 │
//! SuiteFixture::teardown: dispose subject ─► stop runtime
//! ```

pub mod fixture;
pub mod scope;
pub mod subject;

pub use fixture::{SuiteFixture, SuiteFixtureBuilder};
pub use scope::{TestScope, with_scope};
pub use subject::{SubjectEntryPoint, SubjectHost, SubjectLifecycle};
