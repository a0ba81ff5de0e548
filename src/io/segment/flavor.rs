//! Reader flavors: which handler table decodes a segment.

use std::fmt;

use crate::io::segment::scripts::{self, HandlerTable, RecordHandler};
use crate::model::node::{Node, NodeFlags};
use crate::types::TypeId;

/// Dispatch table family selected by segment name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReaderFlavor {
    App,
    BRep,
    Browser,
    Dc,
    DesignView,
    EeData,
    EeScene,
    FbAttribute,
    Graphics,
    Notebook,
    Result,
    Sheet,
    /// Generic fall-through: raw bytes only.
    Default,
}

impl ReaderFlavor {
    /// Every flavor, in declaration order.
    pub const ALL: [ReaderFlavor; 13] = [
        ReaderFlavor::App,
        ReaderFlavor::BRep,
        ReaderFlavor::Browser,
        ReaderFlavor::Dc,
        ReaderFlavor::DesignView,
        ReaderFlavor::EeData,
        ReaderFlavor::EeScene,
        ReaderFlavor::FbAttribute,
        ReaderFlavor::Graphics,
        ReaderFlavor::Notebook,
        ReaderFlavor::Result,
        ReaderFlavor::Sheet,
        ReaderFlavor::Default,
    ];

    /// Choose the flavor for a segment name.
    ///
    /// Exact names are matched first, then the name's suffix; the `Am`, `Pm`
    /// and `Dl` prefixes make no difference.
    pub fn from_segment_name(name: &str) -> Self {
        match name {
            "DesignViewSegment" => return ReaderFlavor::DesignView,
            "EeDataSegment" => return ReaderFlavor::EeData,
            "EeSceneSegment" => return ReaderFlavor::EeScene,
            "FBAttributeSegment" => return ReaderFlavor::FbAttribute,
            "NBNotebookSegment" => return ReaderFlavor::Notebook,
            "DocDCSegment" => return ReaderFlavor::Dc,
            _ => {}
        }
        const SUFFIXES: &[(&str, ReaderFlavor)] = &[
            ("AppSegment", ReaderFlavor::App),
            ("BRepSegment", ReaderFlavor::BRep),
            ("BrowserSegment", ReaderFlavor::Browser),
            ("DcSegment", ReaderFlavor::Dc),
            ("DCSegment", ReaderFlavor::Dc),
            ("GraphicsSegment", ReaderFlavor::Graphics),
            ("RxSegment", ReaderFlavor::Result),
            ("ResultSegment", ReaderFlavor::Result),
            ("SheetSegment", ReaderFlavor::Sheet),
        ];
        SUFFIXES
            .iter()
            .find(|(suffix, _)| name.ends_with(suffix))
            .map(|(_, flavor)| *flavor)
            .unwrap_or(ReaderFlavor::Default)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ReaderFlavor::App => "application",
            ReaderFlavor::BRep => "B-Rep",
            ReaderFlavor::Browser => "browser",
            ReaderFlavor::Dc => "DC",
            ReaderFlavor::DesignView => "design-view",
            ReaderFlavor::EeData => "EE-data",
            ReaderFlavor::EeScene => "EE-scene",
            ReaderFlavor::FbAttribute => "FB-attribute",
            ReaderFlavor::Graphics => "graphics",
            ReaderFlavor::Notebook => "notebook",
            ReaderFlavor::Result => "result",
            ReaderFlavor::Sheet => "sheet",
            ReaderFlavor::Default => "default",
        }
    }

    /// Handler table of the flavor; `None` for the default flavor.
    pub fn handlers(&self) -> Option<&'static HandlerTable> {
        let table: &'static HandlerTable = match self {
            ReaderFlavor::App => &scripts::app::TABLE,
            ReaderFlavor::BRep => &scripts::brep::TABLE,
            ReaderFlavor::Browser => &scripts::browser::TABLE,
            ReaderFlavor::Dc => &scripts::dc::TABLE,
            ReaderFlavor::DesignView => &scripts::design_view::TABLE,
            ReaderFlavor::EeData => &scripts::ee_data::TABLE,
            ReaderFlavor::EeScene => &scripts::ee_scene::TABLE,
            ReaderFlavor::FbAttribute => &scripts::fb_attribute::TABLE,
            ReaderFlavor::Graphics => &scripts::graphics::TABLE,
            ReaderFlavor::Notebook => &scripts::notebook::TABLE,
            ReaderFlavor::Result => &scripts::result::TABLE,
            ReaderFlavor::Sheet => &scripts::sheet::TABLE,
            ReaderFlavor::Default => return None,
        };
        Some(table)
    }

    /// Handler registered for a type id.
    pub fn handler(&self, type_id: TypeId) -> Option<&'static RecordHandler> {
        self.handlers()?.get(&type_id.short())
    }

    /// Truncated type id registered under a type name.
    pub fn type_id_of(&self, type_name: &str) -> Option<u32> {
        self.handlers()?
            .iter()
            .find(|(_, h)| h.type_name == type_name)
            .map(|(id, _)| *id)
    }

    /// Record types of this flavor whose declared size may fall short of
    /// the actual record.
    pub fn variable_size_types(&self) -> &'static [u32] {
        match self {
            ReaderFlavor::BRep => &[scripts::brep::ACIS_ENTITY_DATA],
            ReaderFlavor::Graphics => &[scripts::graphics::MESH_PART],
            ReaderFlavor::Notebook => &[scripts::notebook::NOTE_TEXT],
            _ => &[],
        }
    }

    /// Whether records of this type may overrun their declared size. Only
    /// the flavor owning the type scans for the record end.
    pub fn is_variable_size(&self, type_id: TypeId) -> bool {
        let id = type_id.short();
        self.variable_size_types().contains(&id) && self.handler(type_id).is_some()
    }

    /// Create a node shell for a record, naming it after its handler.
    pub fn create_node(&self, index: u32, type_id: TypeId, offset: usize, data: Vec<u8>) -> Node {
        let mut node = Node::new(index, type_id, offset, data);
        match self.handler(type_id) {
            Some(handler) => node.type_name = Some(handler.type_name),
            None => node.flags.insert(NodeFlags::UNKNOWN_TYPE),
        }
        node
    }
}

impl fmt::Display for ReaderFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
