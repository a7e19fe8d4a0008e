use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::model::{
    Answer, Caveat, Criterion, DecisionModel, DomainLogic, ImportCounts, Question, RuleType,
    Section, SourceHash, Target,
};

mod answers;
mod error;
mod ids;
mod linking;
mod lookups;
mod normalize;
mod questions;
mod run;
mod source;
mod targets;

pub use run::run;

use answers::*;
use error::*;
use ids::*;
use linking::*;
use lookups::*;
use normalize::*;
use questions::*;
use source::*;
use targets::*;
