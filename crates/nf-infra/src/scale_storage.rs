//! In-memory scale cache, one store per content object.
//! 内存缩放缓存，每个内容对象一份。

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use nf_core::ports::{ImageContentPort, ScaleStoragePort, ScaleStorageProviderPort};
use nf_core::{
    GeneratedScale, ModificationMarker, ScaleId, ScaleKey, ScaleRecord, ScaleRequest,
    ScalingError,
};
use tracing::{debug, debug_span};

/// Scale records of one content object, bounded by record count.
/// 单个内容对象的缩放记录，按记录数限制容量。
pub struct AnnotationScaleStorage {
    inner: Mutex<Inner>,
}

struct Inner {
    records: HashMap<ScaleId, ScaleRecord>,
    keys: HashMap<ScaleKey, ScaleId>,
    queue: VecDeque<ScaleId>,
    max_records: usize,
}

impl AnnotationScaleStorage {
    pub fn new(max_records: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                records: HashMap::new(),
                keys: HashMap::new(),
                queue: VecDeque::new(),
                max_records: max_records.max(1),
            }),
        }
    }

    /// Number of records currently held, superseded ones included.
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Inner {
    fn current(&self, key: &ScaleKey) -> Option<&ScaleRecord> {
        self.keys.get(key).and_then(|uid| self.records.get(uid))
    }

    fn insert(&mut self, record: ScaleRecord) {
        self.keys.insert(record.key.clone(), record.uid.clone());
        self.queue.push_back(record.uid.clone());
        self.records.insert(record.uid.clone(), record);
        self.evict_if_needed();
    }

    fn remove(&mut self, uid: &ScaleId) {
        if let Some(record) = self.records.remove(uid) {
            if self.keys.get(&record.key) == Some(uid) {
                self.keys.remove(&record.key);
            }
        }
    }

    fn evict_if_needed(&mut self) {
        while self.records.len() > self.max_records {
            if let Some(evicted) = self.pop_oldest_superseded() {
                self.remove(&evicted);
                continue;
            }
            if let Some(evicted) = self.queue.pop_front() {
                self.remove(&evicted);
            } else {
                break;
            }
        }
    }

    fn pop_oldest_superseded(&mut self) -> Option<ScaleId> {
        let pos = self.queue.iter().position(|uid| {
            self.records
                .get(uid)
                .map(|record| self.keys.get(&record.key) != Some(uid))
                .unwrap_or(true)
        })?;
        self.queue.remove(pos)
    }
}

impl ScaleStoragePort for AnnotationScaleStorage {
    fn get(&self, uid: &ScaleId) -> Option<ScaleRecord> {
        self.lock().records.get(uid).cloned()
    }

    fn scale(
        &self,
        request: &ScaleRequest,
        modified: &dyn Fn() -> ModificationMarker,
        create: &dyn Fn(&ScaleRequest) -> Result<Option<GeneratedScale>, ScalingError>,
    ) -> Result<Option<ScaleRecord>, ScalingError> {
        let span = debug_span!(
            "infra.scale_storage.scale",
            fieldname = %request.fieldname,
            scale = ?request.scale,
        );
        let _enter = span.enter();

        let key = request.key();
        let cached = self.lock().current(&key).cloned();
        let mut stamp = None;
        if let Some(record) = cached {
            let current = modified();
            if record.is_fresh(&current) {
                debug!(uid = %record.uid, "scale cache hit");
                return Ok(Some(record));
            }
            debug!(uid = %record.uid, "cached scale is stale");
            stamp = Some(current);
        }

        // generated outside the lock; concurrent callers may duplicate work
        let Some(generated) = create(request)? else {
            debug!("scale factory produced nothing");
            return Ok(None);
        };
        let stamp = stamp.unwrap_or_else(modified);
        let record = ScaleRecord::from_generated(request, generated, stamp);

        let mut inner = self.lock();
        if let Some(existing) = inner.current(&key).filter(|r| r.is_fresh(&record.modified)) {
            debug!(uid = %existing.uid, "scale stored concurrently; returning existing record");
            return Ok(Some(existing.clone()));
        }
        debug!(uid = %record.uid, "stored new scale");
        inner.insert(record.clone());
        Ok(Some(record))
    }
}

/// Attaches an [`AnnotationScaleStorage`] to each content object on first use.
/// 首次使用时为每个内容对象挂载独立的缩放缓存。
///
/// The store lives in the object's [`ScaleAnnotation`](nf_core::ports::ScaleAnnotation)
/// and is released with it; nothing is retained here.
pub struct AnnotationScaleStorages {
    max_records: usize,
}

impl AnnotationScaleStorages {
    pub fn new(max_records: usize) -> Self {
        Self { max_records }
    }
}

impl ScaleStorageProviderPort for AnnotationScaleStorages {
    fn storage_for(&self, content: &dyn ImageContentPort) -> Arc<dyn ScaleStoragePort> {
        content.scale_annotation().get_or_init(|| {
            debug!(url = %content.absolute_url(), "attaching scale storage");
            Arc::new(AnnotationScaleStorage::new(self.max_records))
        })
    }
}
