use foundation::math::LonLat;
use formats::{VectorChunk, VectorChunkError, VectorFeature};
use tracing::debug;

use crate::country::CountryCode;

/// Identifier candidates, in priority order. `None` means the feature id.
const CODE_CANDIDATES: [Option<&str>; 3] = [None, Some("ISO_A3"), Some("iso_a3")];
const NAME_CANDIDATES: [&str; 3] = ["ADMIN", "name", "NAME"];

/// Natural Earth marks countries without an assigned code this way.
const MISSING_CODE: &str = "-99";

/// Index of a feature inside its [`GeoFeatureStore`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct CountryFeature {
    /// `None` for features that cannot be joined against the series.
    pub code: Option<CountryCode>,
    pub name: String,
    /// Polygons as rings of positions, outer ring first. Empty for non-areal features.
    pub polygons: Vec<Vec<Vec<LonLat>>>,
}

impl CountryFeature {
    pub fn from_vector_feature(feature: &VectorFeature) -> Self {
        let code = CODE_CANDIDATES.iter().find_map(|candidate| {
            let raw = match candidate {
                None => feature.id.clone(),
                Some(key) => feature.property_str(key),
            }?;
            CountryCode::normalize(&raw).filter(|code| code.as_str() != MISSING_CODE)
        });

        let name = NAME_CANDIDATES
            .iter()
            .find_map(|key| feature.property_str(key))
            .unwrap_or_default();

        let polygons = feature
            .geometry
            .as_ref()
            .map(|g| g.polygons().into_iter().map(|rings| rings.to_vec()).collect())
            .unwrap_or_default();

        Self {
            code,
            name,
            polygons,
        }
    }

    pub fn is_joinable(&self) -> bool {
        self.code.is_some()
    }
}

/// Ordered, immutable set of country boundary features.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoFeatureStore {
    features: Vec<CountryFeature>,
}

impl GeoFeatureStore {
    pub fn from_chunk(chunk: &VectorChunk) -> Self {
        let features: Vec<CountryFeature> = chunk
            .features
            .iter()
            .map(CountryFeature::from_vector_feature)
            .collect();
        let store = Self { features };
        debug!(
            features = store.len(),
            joinable = store.joinable_count(),
            "boundary features loaded"
        );
        store
    }

    pub fn from_geojson_str(payload: &str) -> Result<Self, VectorChunkError> {
        Ok(Self::from_chunk(&VectorChunk::from_geojson_str(payload)?))
    }

    pub fn get(&self, id: FeatureId) -> Option<&CountryFeature> {
        self.features.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureId, &CountryFeature)> {
        self.features
            .iter()
            .enumerate()
            .map(|(i, f)| (FeatureId(i), f))
    }

    pub fn find_by_code(&self, code: &CountryCode) -> Option<FeatureId> {
        self.iter()
            .find(|(_, f)| f.code.as_ref() == Some(code))
            .map(|(id, _)| id)
    }

    pub fn joinable_count(&self) -> usize {
        self.features.iter().filter(|f| f.is_joinable()).count()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
