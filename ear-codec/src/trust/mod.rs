// Licensed under the Apache-2.0 license

pub mod claim;
pub mod tier;
pub mod vector;
