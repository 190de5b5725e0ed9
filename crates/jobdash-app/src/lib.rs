// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod export;
pub mod ids;
pub mod model;
pub mod pipeline;
pub mod state;
pub mod summary;

pub use export::*;
pub use ids::*;
pub use model::*;
pub use pipeline::*;
pub use state::*;
pub use summary::*;
