use image::RgbImage;
use ndarray::ArrayView2;
use once_cell::sync::OnceCell;
use tracing::{debug, info, instrument};

use crate::document::analysis::synthesis::BlockSynthesizer;
use crate::document::detection::Detection;
use crate::document::error::LayoutError;
use crate::document::layout_block::LayoutBlock;
use crate::document::region::RegionGrouper;
use crate::inference::decoder;
use crate::inference::detector::LayoutDetector;
use crate::inference::error::InferenceError;
use crate::inference::session_pool::SessionPool;
use crate::utils::box_utils;
use crate::utils::config::PipelineConfig;
use crate::utils::letterbox::{letterbox_forward, LetterboxMeta};

type DetectorFactory<D> = Box<dyn Fn() -> Result<D, InferenceError> + Send + Sync>;

/// Post-processing of one page's raw model output into ordered blocks.
pub struct LayoutPipeline<'a> {
    config: &'a PipelineConfig,
}

impl<'a> LayoutPipeline<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    /// Decodes, recovers and suppresses the candidates of a `[4 + C, N]` tensor.
    ///
    /// Overview detections are removed before suppression so a page-sized
    /// overview box never competes with the regions it encloses.
    pub fn detections(
        &self,
        raw: ArrayView2<'_, f32>,
        meta: &LetterboxMeta,
        conf_threshold: f32,
        iou_threshold: f32,
    ) -> Vec<Detection> {
        let candidates = decoder::decode_candidates(raw, conf_threshold);
        let decoded = candidates.len();

        let detections: Vec<Detection> = decoder::recover_detections(&candidates, meta)
            .into_iter()
            .filter(|detection| !self.config.classes.is_overview(detection.class_id))
            .collect();

        let kept = box_utils::apply_nms(detections, iou_threshold);
        debug!(
            "Decoded {} candidates, {} kept after suppression",
            decoded,
            kept.len()
        );
        kept
    }

    /// Runs the full post-processing chain for one page.
    pub fn blocks(
        &self,
        raw: ArrayView2<'_, f32>,
        meta: &LetterboxMeta,
        page_number: usize,
        conf_threshold: f32,
        iou_threshold: f32,
    ) -> Vec<LayoutBlock> {
        let detections = self.detections(raw, meta, conf_threshold, iou_threshold);
        let groups = RegionGrouper::new(&self.config.classes).group(&detections);

        BlockSynthesizer::new(&self.config.classes, self.config.reading_order_tolerance)
            .synthesize(&groups, page_number, meta.orig_width, meta.orig_height)
    }

    /// Validates thresholds, runs `detector` on `image` and post-processes the
    /// output.
    pub fn analyze_page<D: LayoutDetector + ?Sized>(
        &self,
        detector: &mut D,
        image: &RgbImage,
        page_number: usize,
        conf_threshold: f32,
        iou_threshold: f32,
    ) -> Result<Vec<LayoutBlock>, LayoutError> {
        let conf_threshold = LayoutError::check_threshold("conf_threshold", conf_threshold)?;
        let iou_threshold = LayoutError::check_threshold("iou_threshold", iou_threshold)?;

        let meta = letterbox_forward(image.width(), image.height(), self.config.model_size);
        let raw = detector.detect(image, self.config.model_size)?;

        Ok(self.blocks(raw.view(), &meta, page_number, conf_threshold, iou_threshold))
    }
}

/// Owns the pipeline configuration and the cached model instances.
///
/// Models are created on first use through the factory and reused for every
/// later page. A failed initialisation is not cached; the next call retries.
pub struct PipelineContext<D: LayoutDetector> {
    config: PipelineConfig,
    pool_size: usize,
    factory: DetectorFactory<D>,
    models: OnceCell<SessionPool<D>>,
}

impl<D: LayoutDetector> PipelineContext<D> {
    /// Creates a context whose `pool_size` model instances are built by
    /// `factory` on first use.
    pub fn new<F>(config: PipelineConfig, pool_size: usize, factory: F) -> Result<Self, LayoutError>
    where
        F: Fn() -> Result<D, InferenceError> + Send + Sync + 'static,
    {
        config.validate().map_err(|e| LayoutError::InvalidConfig {
            message: e.to_string(),
        })?;

        Ok(Self {
            config,
            pool_size: pool_size.max(1),
            factory: Box::new(factory),
            models: OnceCell::new(),
        })
    }

    /// Creates a context around an already constructed detector.
    pub fn with_detector(config: PipelineConfig, detector: D) -> Result<Self, LayoutError> {
        let mut context = Self::new(config, 1, || {
            Err(InferenceError::ProcessingError {
                message: "detector was supplied at construction".to_string(),
            })
        })?;
        context.models = OnceCell::with_value(SessionPool::single(detector));
        Ok(context)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Loads the models now instead of on the first page.
    pub fn warm_up(&self) -> Result<(), LayoutError> {
        let pool = self.models()?;
        info!("Layout model ready ({} instance(s))", pool.size());
        Ok(())
    }

    fn models(&self) -> Result<&SessionPool<D>, InferenceError> {
        self.models
            .get_or_try_init(|| SessionPool::new(self.pool_size, &self.factory))
    }

    /// Analyses one page with the configured thresholds.
    pub fn analyze_page(
        &self,
        image: &RgbImage,
        page_number: usize,
    ) -> Result<Vec<LayoutBlock>, LayoutError> {
        self.analyze_page_with(
            image,
            page_number,
            self.config.conf_threshold,
            self.config.iou_threshold,
        )
    }

    /// Analyses one page with explicit thresholds.
    ///
    /// A blank page yields `Ok` with no blocks; a failing model yields
    /// [`LayoutError::ModelProcessingError`].
    #[instrument(skip(self, image), fields(page_number = page_number))]
    pub fn analyze_page_with(
        &self,
        image: &RgbImage,
        page_number: usize,
        conf_threshold: f32,
        iou_threshold: f32,
    ) -> Result<Vec<LayoutBlock>, LayoutError> {
        let conf_threshold = LayoutError::check_threshold("conf_threshold", conf_threshold)?;
        let iou_threshold = LayoutError::check_threshold("iou_threshold", iou_threshold)?;

        debug!(
            "Analysing {}x{} page (conf {}, iou {})",
            image.width(),
            image.height(),
            conf_threshold,
            iou_threshold
        );

        let model_size = self.config.model_size;
        let meta = letterbox_forward(image.width(), image.height(), model_size);
        let raw = self
            .models()?
            .with(|detector| detector.detect(image, model_size))?;

        let blocks = LayoutPipeline::new(&self.config).blocks(
            raw.view(),
            &meta,
            page_number,
            conf_threshold,
            iou_threshold,
        );

        info!("Page {} produced {} blocks", page_number, blocks.len());
        Ok(blocks)
    }
}
