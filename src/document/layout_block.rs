use serde::{Deserialize, Serialize};

/// The kind of region a block represents in the persisted output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    MainText,
    Illustration,
    Seal,
    #[serde(other)]
    Unknown,
}

/// How the pipeline treats a detector class.
///
/// The role is independent of the block type so that other class taxonomies can
/// reuse the grouping and synthesis stages unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassRole {
    /// Whole-page extent; never grouped and never synthesized into a block.
    Overview,
    /// One vertical line of text; merged into paragraph-level regions.
    TextColumn,
    Illustration,
    /// Stamps and seals; emitted with `skip` set because they carry no text.
    Seal,
    #[serde(other)]
    Other,
}

/// One entry of the class-to-block-type table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSpec {
    pub id: usize,
    pub name: String,
    pub role: ClassRole,
    pub block_type: BlockType,
}

impl ClassSpec {
    pub fn new(id: usize, name: &str, role: ClassRole, block_type: BlockType) -> Self {
        Self {
            id,
            name: name.to_string(),
            role,
            block_type,
        }
    }
}

/// Maps detector class ids to roles and block types.
///
/// Ids absent from the table are treated as [`ClassRole::Other`] and emitted as
/// [`BlockType::Unknown`] singleton blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassMap {
    classes: Vec<ClassSpec>,
}

impl ClassMap {
    pub fn new(classes: Vec<ClassSpec>) -> Self {
        Self { classes }
    }

    /// The taxonomy of the classical-document layout model:
    /// overview, handwritten, typography, illustration, stamp.
    pub fn classical_documents() -> Self {
        Self::new(vec![
            ClassSpec::new(0, "overview", ClassRole::Overview, BlockType::Unknown),
            ClassSpec::new(1, "handwritten", ClassRole::TextColumn, BlockType::MainText),
            ClassSpec::new(2, "typography", ClassRole::TextColumn, BlockType::MainText),
            ClassSpec::new(3, "illustration", ClassRole::Illustration, BlockType::Illustration),
            ClassSpec::new(4, "stamp", ClassRole::Seal, BlockType::Seal),
        ])
    }

    pub fn classes(&self) -> &[ClassSpec] {
        &self.classes
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn get(&self, class_id: usize) -> Option<&ClassSpec> {
        self.classes.iter().find(|spec| spec.id == class_id)
    }

    pub fn role(&self, class_id: usize) -> ClassRole {
        self.get(class_id)
            .map(|spec| spec.role)
            .unwrap_or(ClassRole::Other)
    }

    pub fn block_type(&self, class_id: usize) -> BlockType {
        self.get(class_id)
            .map(|spec| spec.block_type)
            .unwrap_or(BlockType::Unknown)
    }

    #[inline]
    pub fn is_overview(&self, class_id: usize) -> bool {
        self.role(class_id) == ClassRole::Overview
    }

    #[inline]
    pub fn is_text_column(&self, class_id: usize) -> bool {
        self.role(class_id) == ClassRole::TextColumn
    }

    #[inline]
    pub fn skips_ocr(&self, class_id: usize) -> bool {
        self.role(class_id) == ClassRole::Seal
    }

    /// Returns the first duplicated class id, if any.
    pub fn duplicate_id(&self) -> Option<usize> {
        self.classes.iter().enumerate().find_map(|(i, spec)| {
            self.classes[..i]
                .iter()
                .any(|earlier| earlier.id == spec.id)
                .then_some(spec.id)
        })
    }
}

impl Default for ClassMap {
    fn default() -> Self {
        Self::classical_documents()
    }
}

/// A synthesized logical region of a page, the unit handed to transcription.
///
/// Serializes to the persisted block shape:
///
/// ```json
/// {"block_id": "p1_b0", "block_type": "main_text", "bbox": [12, 40, 220, 980], "reading_order": 0, "skip": false}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutBlock {
    pub block_id: String,
    pub block_type: BlockType,
    /// `[x1, y1, x2, y2]` in page pixels, clamped to the image.
    pub bbox: [i32; 4],
    pub reading_order: usize,
    #[serde(rename = "skip")]
    pub skip_ocr: bool,
}

impl LayoutBlock {
    /// Builds the deterministic identifier for a block.
    pub fn make_id(page_number: usize, reading_order: usize) -> String {
        format!("p{page_number}_b{reading_order}")
    }
}
