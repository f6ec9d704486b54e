// ==========================================
// 降水收益决策支持系统 - STAC 编目
// ==========================================
// 输出: catalog.json / collection.json / <item_id>/<item_id>.json
// 版本: STAC 1.0.0
// 资产路径: s3://<bucket>/processing-results/<workflow_id>/...
// ==========================================

use crate::domain::forecast::ProfitPayload;
use crate::domain::types::BoundingBox;
use crate::report::error::ReportResult;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use uuid::Uuid;

pub const STAC_VERSION: &str = "1.0.0";

/// STAC 日期时间格式（UTC）
const STAC_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

// ===== 媒体类型 =====
pub mod media_type {
    pub const PNG: &str = "image/png";
    pub const TEXT: &str = "text/plain";
    pub const JSON: &str = "application/json";
}

// ===== 资产文件名 =====
pub const PROBABILITY_PLOT_FILE: &str = "probability_of_rain.png";
pub const PREDICTION_PLOT_FILE: &str = "prediction.png";
pub const PROFIT_TABLE_FILE: &str = "profit.csv";

// ==========================================
// StacSettings - 编目环境参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StacSettings {
    pub bucket: String,
    pub workflow_id: String,
    /// 未指定时生成随机 UUID
    pub collection_id: Option<String>,
}

impl StacSettings {
    /// 资产所在的桶路径
    pub fn assets_bucket_path(&self) -> String {
        let mut path = format!("s3://{}/processing-results", self.bucket.trim_matches('/'));
        let workflow = self.workflow_id.trim_matches('/');
        if !workflow.is_empty() {
            path.push('/');
            path.push_str(workflow);
        }
        path
    }

    fn href(&self, file: &str) -> String {
        format!("{}/{}", self.assets_bucket_path(), file)
    }
}

// ==========================================
// STAC 对象
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StacLink {
    pub rel: String,
    pub href: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl StacLink {
    fn json(rel: &str, href: String, title: Option<&str>) -> Self {
        Self {
            rel: rel.to_string(),
            href,
            media_type: Some(media_type::JSON.to_string()),
            title: title.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StacAsset {
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub media_type: String,
    pub roles: Vec<String>,
}

impl StacAsset {
    fn data_visual(href: String, title: &str, media_type: &str) -> Self {
        Self {
            href,
            title: Some(title.to_string()),
            media_type: media_type.to_string(),
            roles: vec!["data".to_string(), "visual".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StacCatalog {
    #[serde(rename = "type")]
    pub kind: String,
    pub stac_version: String,
    pub id: String,
    pub description: String,
    pub links: Vec<StacLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialExtent {
    pub bbox: Vec<BoundingBox>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalExtent {
    pub interval: Vec<[Option<String>; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StacExtent {
    pub spatial: SpatialExtent,
    pub temporal: TemporalExtent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StacCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub stac_version: String,
    pub stac_extensions: Vec<String>,
    pub id: String,
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub license: String,
    pub extent: StacExtent,
    pub links: Vec<StacLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StacItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub stac_version: String,
    pub stac_extensions: Vec<String>,
    pub id: String,
    pub geometry: PointGeometry,
    pub bbox: BoundingBox,
    pub properties: serde_json::Map<String, serde_json::Value>,
    pub links: Vec<StacLink>,
    pub assets: BTreeMap<String, StacAsset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
}

/// 一次编目产生的三个对象
#[derive(Debug, Clone, PartialEq)]
pub struct StacBundle {
    pub catalog: StacCatalog,
    pub collection: StacCollection,
    pub item: StacItem,
}

/// 写出的文件路径
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StacPaths {
    pub catalog: PathBuf,
    pub collection: PathBuf,
    pub item: PathBuf,
}

fn stac_datetime(timestamp: &NaiveDateTime) -> String {
    timestamp.format(STAC_DATETIME_FORMAT).to_string()
}

// ==========================================
// CatalogPackager - 编目打包
// ==========================================
pub struct CatalogPackager {
    settings: StacSettings,
}

impl CatalogPackager {
    pub fn new(settings: StacSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &StacSettings {
        &self.settings
    }

    /// 条目 ID: `<layer>-<8 位十六进制>`
    pub fn new_item_id(layer: &str) -> String {
        let suffix: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();
        format!("{}-{}", layer, suffix)
    }

    /// 由收益载荷构建 catalog / collection / item
    #[instrument(skip(self, payload), fields(layer = %payload.layer))]
    pub fn package(&self, payload: &ProfitPayload) -> StacBundle {
        let collection_id = self
            .settings
            .collection_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let item_id = Self::new_item_id(&payload.layer);
        self.package_with_ids(payload, &collection_id, &item_id)
    }

    /// 指定 ID 构建（结果可复现）
    pub fn package_with_ids(
        &self,
        payload: &ProfitPayload,
        collection_id: &str,
        item_id: &str,
    ) -> StacBundle {
        let catalog_href = self.settings.href("catalog.json");
        let collection_href = self.settings.href("collection.json");
        let item_href = self.settings.href(&format!("{0}/{0}.json", item_id));

        // ===== Catalog =====
        let catalog = StacCatalog {
            kind: "Catalog".to_string(),
            stac_version: STAC_VERSION.to_string(),
            id: "catalog".to_string(),
            description: "rain-forecast".to_string(),
            links: vec![
                StacLink::json("root", catalog_href.clone(), None),
                StacLink::json("self", catalog_href.clone(), None),
                StacLink::json("child", collection_href.clone(), Some("Rain forecast")),
            ],
        };

        // ===== Collection =====
        let collection = StacCollection {
            kind: "Collection".to_string(),
            stac_version: STAC_VERSION.to_string(),
            stac_extensions: Vec::new(),
            id: collection_id.to_string(),
            title: "Rain forecast".to_string(),
            description: "rain-forecast".to_string(),
            keywords: vec!["DEC".to_string()],
            license: "proprietary".to_string(),
            extent: StacExtent {
                spatial: SpatialExtent {
                    bbox: vec![payload.bbox],
                },
                temporal: TemporalExtent {
                    interval: vec![[
                        Some(stac_datetime(&payload.start_time)),
                        Some(stac_datetime(&payload.end_time)),
                    ]],
                },
            },
            links: vec![
                StacLink::json("root", catalog_href.clone(), None),
                StacLink::json("parent", catalog_href.clone(), None),
                StacLink::json("self", collection_href.clone(), None),
                StacLink::json("item", item_href.clone(), None),
            ],
        };

        // ===== Item =====
        let mut properties = serde_json::Map::new();
        properties.insert(
            "datetime".to_string(),
            serde_json::Value::String(stac_datetime(&payload.start_time)),
        );

        let mut assets = BTreeMap::new();
        assets.insert(
            "probability_of_rain".to_string(),
            StacAsset::data_visual(
                self.settings.href(PROBABILITY_PLOT_FILE),
                "Probability of rain",
                media_type::PNG,
            ),
        );
        assets.insert(
            "predicted_profit".to_string(),
            StacAsset::data_visual(
                self.settings.href(PREDICTION_PLOT_FILE),
                "Predicted profit",
                media_type::PNG,
            ),
        );
        assets.insert(
            "profit".to_string(),
            StacAsset::data_visual(
                self.settings.href(PROFIT_TABLE_FILE),
                "Profit",
                media_type::TEXT,
            ),
        );

        let item = StacItem {
            kind: "Feature".to_string(),
            stac_version: STAC_VERSION.to_string(),
            stac_extensions: Vec::new(),
            id: item_id.to_string(),
            geometry: PointGeometry {
                kind: "Point".to_string(),
                coordinates: payload.bbox.centroid(),
            },
            bbox: payload.bbox,
            properties,
            links: vec![
                StacLink::json("root", catalog_href, None),
                StacLink::json("parent", collection_href.clone(), None),
                StacLink::json("collection", collection_href, None),
                StacLink::json("self", item_href, None),
            ],
            assets,
            collection: Some(collection_id.to_string()),
        };

        StacBundle {
            catalog,
            collection,
            item,
        }
    }

    /// 写出编目文件
    pub fn write(&self, bundle: &StacBundle, out_dir: &Path) -> ReportResult<StacPaths> {
        let item_dir = out_dir.join(&bundle.item.id);
        fs::create_dir_all(&item_dir)?;

        let paths = StacPaths {
            catalog: out_dir.join("catalog.json"),
            collection: out_dir.join("collection.json"),
            item: item_dir.join(format!("{}.json", bundle.item.id)),
        };

        fs::write(&paths.item, serde_json::to_string_pretty(&bundle.item)?)?;
        info!(path = %paths.item.display(), "STAC item 已写出");
        fs::write(&paths.catalog, serde_json::to_string_pretty(&bundle.catalog)?)?;
        info!(path = %paths.catalog.display(), "STAC catalog 已写出");
        fs::write(
            &paths.collection,
            serde_json::to_string_pretty(&bundle.collection)?,
        )?;
        info!(path = %paths.collection.display(), "STAC collection 已写出");

        Ok(paths)
    }
}
