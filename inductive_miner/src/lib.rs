#![warn(
    clippy::doc_markdown,
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs
)]

#![allow(clippy::needless_doctest_main)]

#![doc = include_str!("../README.md")]

///
/// Compressed event logs ([`UVCL`])
///
pub mod event_log {
    /// JSON import of [`UVCL`]
    pub mod import_uvcl;
    /// Minimal self-distances of activities
    pub mod min_self_distance;
    /// [`UVCL`] struct
    pub mod uvcl_struct;

    #[doc(inline)]
    pub use uvcl_struct::{Activity, Variant, UVCL};
}

///
/// Directly-follows and eventually-follows graphs
///
pub mod dfg {
    /// [`DirectlyFollowsGraph`] struct
    pub mod dfg_struct;
    /// [`EventuallyFollowsGraph`] struct
    pub mod efg_struct;

    #[doc(inline)]
    pub use crate::dfg::dfg_struct::DirectlyFollowsGraph;

    #[doc(inline)]
    pub use crate::dfg::efg_struct::EventuallyFollowsGraph;
}

///
/// Process trees
///
pub mod process_tree {
    /// [`ProcessTree`] struct
    pub mod process_tree_struct;
    /// Structural simplification of process trees
    pub mod simplification;

    #[doc(inline)]
    pub use process_tree_struct::ProcessTree;
}

///
/// Partially ordered workflow language (POWL)
///
pub mod powl {
    /// Binary relations over the children of a partial order
    pub mod binary_relation;
    /// [`POWL`] model
    pub mod powl_struct;
    /// Structural simplification of POWL models
    pub mod simplification;

    #[doc(inline)]
    pub use powl_struct::POWL;
}

///
/// Petri nets
///
pub mod petri_net {
    /// Export [`PetriNet`] to `.pnml`
    pub mod export_pnml;
    /// [`PetriNet`] struct
    pub mod petri_net_struct;
    /// Removal of silent transitions
    pub mod reduction;
    /// Firing rule, replay and workflow net checks
    pub mod semantics;

    #[doc(inline)]
    pub use petri_net_struct::PetriNet;
}

///
/// Conversions between process model formalisms
///
pub mod conversions {
    /// Process trees and POWL models to Petri nets
    pub mod to_petri_net;
}

///
/// Process discovery
///
pub mod discovery;

/// Util module with smaller helper functions, structs or enums
pub mod utils;

#[doc(inline)]
pub use event_log::uvcl_struct::UVCL;

#[doc(inline)]
pub use event_log::import_uvcl::import_uvcl_json_from_path;

#[doc(inline)]
pub use event_log::import_uvcl::import_uvcl_json_from_slice;

#[doc(inline)]
pub use event_log::import_uvcl::import_uvcl_json_from_str;

#[doc(inline)]
pub use discovery::inductive_miner::discover;

#[doc(inline)]
pub use discovery::inductive_miner::discover_powl;

#[doc(inline)]
pub use discovery::inductive_miner::discover_process_tree;

#[doc(inline)]
pub use discovery::inductive_miner::InductiveMinerConfig;

#[doc(inline)]
pub use discovery::inductive_miner::InductiveMinerVariant;

#[doc(inline)]
pub use discovery::inductive_miner::Model;

#[doc(inline)]
pub use process_tree::ProcessTree;

#[doc(inline)]
pub use powl::POWL;

#[doc(inline)]
pub use petri_net::petri_net_struct::PetriNet;

#[doc(inline)]
pub use petri_net::export_pnml::export_petri_net_to_pnml;

#[doc(inline)]
pub use petri_net::export_pnml::export_petri_net_to_pnml_path;

#[doc(inline)]
pub use conversions::to_petri_net::model_to_petri_net;
