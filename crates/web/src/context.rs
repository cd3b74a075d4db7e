//! Type-keyed value storage for hooks, handlers and endpoint construction.
//!
//! A [`TypeMap`] holds at most one value per concrete type. A value can also be exposed as
//! other types through views declared with [`Provider::view`], typically to hand out an
//! `Arc<dyn Trait>` for an `Arc<Impl>`.
//!
//! Lookup tries the exact type first. When no exact entry exists, entries are scanned in a
//! fixed specificity order (more views first, then type name descending) and the first one
//! with a view producing the requested type wins.

use crate::endpoint::EndpointMeta;
use http::Response;
use std::any::{Any, TypeId, type_name};
use std::fmt;
use switchyard_http::protocol::{Body, Request};

type AnyValue = Box<dyn Any + Send + Sync>;
type View = Box<dyn Fn(&(dyn Any + Send + Sync)) -> Option<AnyValue> + Send + Sync>;

/// A stable identifier of a type, with its name for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self { id: TypeId::of::<T>(), name: type_name::<T>() }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// A value plus the other types it can be viewed as.
pub struct Provider<T> {
    value: T,
    views: Vec<(TypeKey, View)>,
}

impl<T: Send + Sync + 'static> Provider<T> {
    pub fn new(value: T) -> Self {
        Self { value, views: Vec::new() }
    }

    /// Exposes the value as `U` as well.
    pub fn view<U, F>(mut self, f: F) -> Self
    where
        U: Send + Sync + 'static,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        let view: View = Box::new(move |any| any.downcast_ref::<T>().map(|t| Box::new(f(t)) as AnyValue));
        self.views.push((TypeKey::of::<U>(), view));
        self
    }
}

impl<T> fmt::Debug for Provider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let views: Vec<_> = self.views.iter().map(|(key, _)| key.name).collect();
        f.debug_struct("Provider").field("type", &type_name::<T>()).field("views", &views).finish()
    }
}

struct Entry {
    key: TypeKey,
    value: AnyValue,
    views: Vec<(TypeKey, View)>,
}

impl Entry {
    fn view<T: 'static>(&self) -> Option<T> {
        let wanted = TypeId::of::<T>();
        self.views
            .iter()
            .filter(|(key, _)| key.id == wanted)
            .find_map(|(_, view)| view(&*self.value))
            .and_then(|value| value.downcast::<T>().ok())
            .map(|boxed| *boxed)
    }
}

#[derive(Default)]
pub struct TypeMap {
    // kept in specificity order
    entries: Vec<Entry>,
}

impl TypeMap {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stores `value` under its own type, returning the value it replaces.
    pub fn insert<T: Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.provide(Provider::new(value))
    }

    /// Stores a provider's value and views, returning the value of the same type it replaces.
    pub fn provide<T: Send + Sync + 'static>(&mut self, provider: Provider<T>) -> Option<T> {
        let previous = self.remove::<T>();
        let entry = Entry { key: TypeKey::of::<T>(), value: Box::new(provider.value), views: provider.views };
        let index = self.entries.partition_point(|e| specificity(e, &entry).is_lt());
        self.entries.insert(index, entry);
        previous
    }

    pub fn remove<T: 'static>(&mut self) -> Option<T> {
        let index = self.position::<T>()?;
        let entry = self.entries.remove(index);
        entry.value.downcast::<T>().ok().map(|boxed| *boxed)
    }

    fn position<T: 'static>(&self) -> Option<usize> {
        let id = TypeId::of::<T>();
        self.entries.iter().position(|e| e.key.id == id)
    }

    /// The value stored under exactly `T`.
    pub fn get_ref<T: 'static>(&self) -> Option<&T> {
        self.entries[self.position::<T>()?].value.downcast_ref()
    }

    pub fn get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        let index = self.position::<T>()?;
        self.entries[index].value.downcast_mut()
    }

    /// A `T`: the exact entry if present, otherwise the most specific view producing one.
    pub fn get<T: Clone + 'static>(&self) -> Option<T> {
        if let Some(value) = self.get_ref::<T>() {
            return Some(value.clone());
        }
        self.entries.iter().find_map(Entry::view::<T>)
    }

    pub fn contains<T: 'static>(&self) -> bool {
        let id = TypeId::of::<T>();
        self.entries.iter().any(|e| e.key.id == id || e.views.iter().any(|(key, _)| key.id == id))
    }

    /// Stored type names, in lookup order.
    pub fn type_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.key.name).collect()
    }
}

/// More views sort first; ties are broken by type name, descending.
fn specificity(a: &Entry, b: &Entry) -> std::cmp::Ordering {
    b.views.len().cmp(&a.views.len()).then_with(|| b.key.name.cmp(a.key.name))
}

impl fmt::Debug for TypeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter().map(|e| e.key.name)).finish()
    }
}

/// The request-scoped values seen by the hooks and the handler of one dispatch.
///
/// Created holding the [`Request`] and the [`EndpointMeta`] of the matched registration. The
/// handler's response is stored after invocation, where the after hook can inspect or replace
/// it.
pub struct DispatchContext {
    values: TypeMap,
    response: Option<Response<Body>>,
}

impl DispatchContext {
    pub fn new(request: Request, meta: EndpointMeta) -> Self {
        let mut values = TypeMap::new();
        values.insert(request);
        values.insert(meta);
        Self { values, response: None }
    }

    pub fn request(&self) -> Option<&Request> {
        self.values.get_ref()
    }

    pub fn meta(&self) -> Option<&EndpointMeta> {
        self.values.get_ref()
    }

    #[inline]
    pub fn values(&self) -> &TypeMap {
        &self.values
    }

    pub fn insert<T: Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.values.insert(value)
    }

    pub fn provide<T: Send + Sync + 'static>(&mut self, provider: Provider<T>) -> Option<T> {
        self.values.provide(provider)
    }

    pub fn get<T: Clone + 'static>(&self) -> Option<T> {
        self.values.get()
    }

    pub fn get_ref<T: 'static>(&self) -> Option<&T> {
        self.values.get_ref()
    }

    pub fn get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.values.get_mut()
    }

    pub fn response(&self) -> Option<&Response<Body>> {
        self.response.as_ref()
    }

    pub fn response_mut(&mut self) -> Option<&mut Response<Body>> {
        self.response.as_mut()
    }

    /// Stores the response, returning the one it replaces.
    pub fn set_response(&mut self, response: Response<Body>) -> Option<Response<Body>> {
        self.response.replace(response)
    }

    pub fn take_response(&mut self) -> Option<Response<Body>> {
        self.response.take()
    }
}

impl fmt::Debug for DispatchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchContext")
            .field("values", &self.values)
            .field("response", &self.response.as_ref().map(Response::status))
            .finish()
    }
}
