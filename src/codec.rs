//! Encode/decode structures to/from attribute lists.
//!
//! A [`Codec`] is the compiled plan for one structure type: an ordered list
//! of steps, one per bound field, with embedded structures spliced in place.
//! Codecs are built once per type on first use ([`codec`]) and shared for the
//! rest of the process lifetime.

use crate::ast::{AttrDescriptor, Conformance};
use crate::binding::{FieldType, Leaf};
use crate::decoder::{DecodeError, DecodeOptions, Decoder, PathElem, ValueError};
use crate::object::{Fields, Object};
use crate::parser::{parse_tag, TagError};
use crate::value::{Attribute, Attributes, Tag, Value, ValueType, Values};
use log::debug;
use once_cell::sync::Lazy;
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("{typename}.{field}: {source}")]
    Tag {
        typename: String,
        field: String,
        source: TagError,
    },
    #[error("{typename}.{field}: attribute {attr:?} already used by {first}")]
    Duplicate {
        typename: String,
        field: String,
        attr: String,
        first: String,
    },
    #[error("{typename}.{field}: can't represent {kind} as {tag}")]
    Incompatible {
        typename: String,
        field: String,
        kind: String,
        tag: Tag,
    },
    #[error("{0}: contains no bindable fields")]
    NoFields(String),
    #[error("{0}: recursive collection type")]
    Recursive(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Name and tag of an attribute a type knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrInfo {
    pub name: String,
    pub tag: Tag,
}

type StepEncodeFn<S> = Arc<dyn Fn(&S) -> Values + Send + Sync>;
type StepDecodeFn<S> = Arc<dyn Fn(&mut Decoder, &mut S, &[(Tag, Value)]) -> Result<(), DecodeError> + Send + Sync>;
type IsZeroFn<S> = Arc<dyn Fn(&S) -> bool + Send + Sync>;
type SetZeroFn<S> = Arc<dyn Fn(&mut S) + Send + Sync>;

/// One field's binding.
pub struct Step<S> {
    /// Field name, for diagnostics.
    pub field: String,
    pub desc: AttrDescriptor,
    pub slice: bool,
    encode: StepEncodeFn<S>,
    decode: StepDecodeFn<S>,
    is_zero: IsZeroFn<S>,
    set_zero: SetZeroFn<S>,
}

impl<S: 'static> Step<S> {
    /// Re-target a step of an embedded structure onto its parent.
    fn embed<P: 'static>(self, get: fn(&P) -> &S, get_mut: fn(&mut P) -> &mut S) -> Step<P> {
        let Step {
            field,
            desc,
            slice,
            encode,
            decode,
            is_zero,
            set_zero,
        } = self;
        Step {
            field,
            desc,
            slice,
            encode: Arc::new(move |p: &P| encode(get(p))),
            decode: Arc::new(move |dec: &mut Decoder, p: &mut P, vals: &[(Tag, Value)]| {
                decode(dec, get_mut(p), vals)
            }),
            is_zero: Arc::new(move |p: &P| is_zero(get(p))),
            set_zero: Arc::new(move |p: &mut P| set_zero(get_mut(p))),
        }
    }
}

/// Collects the steps of one structure type.
///
/// The name map is shared with embedded structures so an attribute name
/// can be bound only once across the whole spliced type.
pub struct CodecBuilder<'a, S> {
    typename: String,
    names: &'a mut HashMap<String, String>,
    steps: Vec<Step<S>>,
    error: Option<BuildError>,
}

impl<'a, S: Fields> CodecBuilder<'a, S> {
    fn new(names: &'a mut HashMap<String, String>) -> Self {
        CodecBuilder {
            typename: short_type_name::<S>(),
            names,
            steps: Vec::new(),
            error: None,
        }
    }

    /// Bind `field` to the attribute described by `tag`.
    pub fn field<F: FieldType>(
        &mut self,
        field: &str,
        tag: &str,
        get: fn(&S) -> &F,
        get_mut: fn(&mut S) -> &mut F,
    ) -> &mut Self {
        if self.error.is_none() {
            if let Err(err) = self.bind(field, tag, get, get_mut) {
                self.error = Some(err);
            }
        }
        self
    }

    /// Splice the fields of an embedded structure in place.
    pub fn embed<E: Fields>(
        &mut self,
        field: &str,
        get: fn(&S) -> &E,
        get_mut: fn(&mut S) -> &mut E,
    ) -> &mut Self {
        if self.error.is_some() {
            return self;
        }

        let mut nested = CodecBuilder::<E>::new(&mut *self.names);
        E::fields(&mut nested);
        match nested.finish() {
            Ok(steps) => {
                debug!("{}.{}: embedding {} steps", self.typename, field, steps.len());
                self.steps
                    .extend(steps.into_iter().map(|step| step.embed(get, get_mut)));
            }
            Err(err) => self.error = Some(err),
        }
        self
    }

    fn bind<F: FieldType>(
        &mut self,
        field: &str,
        tag: &str,
        get: fn(&S) -> &F,
        get_mut: fn(&mut S) -> &mut F,
    ) -> Result<(), BuildError> {
        let mut desc = parse_tag(tag).map_err(|source| BuildError::Tag {
            typename: self.typename.clone(),
            field: field.to_string(),
            source,
        })?;

        match self.names.entry(desc.name.clone()) {
            Entry::Occupied(first) => {
                return Err(BuildError::Duplicate {
                    typename: self.typename.clone(),
                    field: field.to_string(),
                    attr: desc.name,
                    first: first.get().clone(),
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(field.to_string());
            }
        }

        let leaf = <F::Leaf as Leaf>::binding()?;

        // Explicit tag > forced tag > natural tag. Kinds whose values carry
        // their own tags (natural `Tag::ZERO`) take no explicit tag.
        let natural = leaf.tag;
        let resolved = if desc.tag != Tag::ZERO {
            desc.tag
        } else {
            leaf.forced.unwrap_or(natural)
        };
        if !compatible(resolved, natural) {
            return Err(BuildError::Incompatible {
                typename: self.typename.clone(),
                field: field.to_string(),
                kind: short_type_name::<F::Leaf>(),
                tag: resolved,
            });
        }
        desc.tag = resolved;

        let leaf = if desc.is_bounded() {
            leaf.with_bounds(desc.min, desc.max)
        } else {
            leaf
        };
        let adapter = F::adapt(leaf, desc.zero_tag);
        let encode = adapter.encode;
        let decode = adapter.decode;

        self.steps.push(Step {
            field: field.to_string(),
            desc,
            slice: F::REPEATED,
            encode: Arc::new(move |s: &S| encode(get(s))),
            decode: Arc::new(
                move |dec: &mut Decoder, s: &mut S, vals: &[(Tag, Value)]| -> Result<(), DecodeError> {
                    *get_mut(s) = decode(dec, vals)?;
                    Ok(())
                },
            ),
            is_zero: Arc::new(move |s: &S| get(s).is_zero()),
            set_zero: Arc::new(move |s: &mut S| *get_mut(s) = F::default()),
        });
        Ok(())
    }

    fn finish(self) -> Result<Vec<Step<S>>, BuildError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if self.steps.is_empty() {
            return Err(BuildError::NoFields(self.typename));
        }
        Ok(self.steps)
    }
}

/// Same value type, or string vs. octetString.
fn compatible(tag: Tag, natural: Tag) -> bool {
    let (a, b) = (tag.value_type(), natural.value_type());
    a == b
        || matches!(
            (a, b),
            (ValueType::String, ValueType::Binary) | (ValueType::Binary, ValueType::String)
        )
}

/// Compiled plan for one structure type.
pub struct Codec<S> {
    typename: String,
    steps: Vec<Step<S>>,
    by_name: HashMap<String, usize>,
    known: Vec<AttrInfo>,
}

impl<S> fmt::Debug for Codec<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("typename", &self.typename)
            .field("known", &self.known)
            .finish()
    }
}

impl<S: Fields> Codec<S> {
    fn build() -> Result<Self, BuildError> {
        let typename = short_type_name::<S>();
        let _guard = BuildGuard::enter(TypeId::of::<S>(), &typename)?;

        let mut names = HashMap::new();
        let mut builder = CodecBuilder::<S>::new(&mut names);
        S::fields(&mut builder);
        let steps = builder.finish()?;

        let by_name = steps
            .iter()
            .enumerate()
            .map(|(i, step)| (step.desc.name.clone(), i))
            .collect();
        let known = steps
            .iter()
            .map(|step| AttrInfo {
                name: step.desc.name.clone(),
                tag: step.desc.tag,
            })
            .collect();

        debug!("built codec for {typename}: {} steps", steps.len());
        Ok(Codec {
            typename,
            steps,
            by_name,
            known,
        })
    }

    pub fn typename(&self) -> &str {
        &self.typename
    }

    pub fn steps(&self) -> &[Step<S>] {
        &self.steps
    }

    pub fn known_attrs(&self) -> &[AttrInfo] {
        &self.known
    }

    /// Encode `obj`, one attribute per non-omitted step, in step order.
    pub fn encode_attrs(&self, obj: &S) -> Attributes {
        let mut attrs = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            let desc = &step.desc;
            if (step.is_zero)(obj) {
                if desc.zero_tag != Tag::ZERO {
                    attrs.push(Attribute::new(desc.name.clone(), desc.zero_tag, Value::Void));
                    continue;
                }
                if desc.conformance == Conformance::Optional {
                    continue;
                }
            }

            let mut values = (step.encode)(obj);
            if values.is_empty() {
                continue;
            }
            for (tag, _) in values.iter_mut() {
                if *tag == Tag::ZERO {
                    *tag = desc.tag;
                }
            }
            attrs.push(Attribute::with_values(desc.name.clone(), values));
        }

        attrs
    }

    /// Decode `obj` from `attrs`, step by step. Only the first occurrence
    /// of each attribute name is used. Fields without a matching attribute
    /// are left untouched.
    pub fn decode_attrs(
        &self,
        dec: &mut Decoder,
        obj: &mut S,
        attrs: &[Attribute],
    ) -> Result<(), DecodeError> {
        let by_name = dedup(&self.typename, attrs);

        dec.path_enter();
        let res = self.decode_steps(dec, obj, &by_name);
        dec.path_leave();
        res
    }

    fn decode_steps(
        &self,
        dec: &mut Decoder,
        obj: &mut S,
        by_name: &HashMap<&str, &Attribute>,
    ) -> Result<(), DecodeError> {
        for step in &self.steps {
            dec.path_set(PathElem::Name(step.desc.name.clone()));
            match by_name.get(step.desc.name.as_str()) {
                Some(attr) => self.decode_step(dec, obj, step, &attr.values)?,
                None if step.desc.conformance == Conformance::Required => {
                    let err = dec.error(ValueError::MissingRequired);
                    dec.push(err);
                }
                None => {}
            }
        }
        Ok(())
    }

    /// Decode a single attribute; unknown names are ignored.
    pub fn decode_one(
        &self,
        dec: &mut Decoder,
        obj: &mut S,
        attr: &Attribute,
    ) -> Result<(), DecodeError> {
        let Some(&i) = self.by_name.get(&attr.name) else {
            return Ok(());
        };

        dec.path_enter();
        dec.path_set(PathElem::Name(attr.name.clone()));
        let res = self.decode_step(dec, obj, &self.steps[i], &attr.values);
        dec.path_leave();
        res
    }

    fn decode_step(
        &self,
        dec: &mut Decoder,
        obj: &mut S,
        step: &Step<S>,
        values: &[(Tag, Value)],
    ) -> Result<(), DecodeError> {
        if values.is_empty() {
            return Err(dec.error(ValueError::NoValues));
        }
        if !step.slice && values.len() > 1 {
            let err = dec.error(ValueError::TooManyValues(values.len()));
            dec.push(err);
        }

        match (step.decode)(dec, obj, values) {
            Ok(()) => Ok(()),
            Err(err) if err.is_oob() => {
                (step.set_zero)(obj);
                Ok(())
            }
            Err(err) if dec.keep_trying() => {
                dec.push(err);
                (step.set_zero)(obj);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

/// Index attributes by name, keeping the first occurrence of each.
pub(crate) fn dedup<'a>(typename: &str, attrs: &'a [Attribute]) -> HashMap<&'a str, &'a Attribute> {
    let mut by_name = HashMap::with_capacity(attrs.len());
    for attr in attrs {
        match by_name.entry(attr.name.as_str()) {
            Entry::Vacant(slot) => {
                slot.insert(attr);
            }
            Entry::Occupied(_) => {
                debug!("{typename}: duplicate attribute {:?} ignored", attr.name);
            }
        }
    }
    by_name
}

type CodecMap = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

static CODECS: Lazy<RwLock<CodecMap>> = Lazy::new(|| RwLock::new(HashMap::new()));

thread_local! {
    static BUILDING: RefCell<Vec<TypeId>> = const { RefCell::new(Vec::new()) };
}

/// Marks a type as being built on this thread, to catch self-nesting types.
struct BuildGuard(TypeId);

impl BuildGuard {
    fn enter(id: TypeId, typename: &str) -> Result<Self, BuildError> {
        BUILDING.with(|building| {
            let mut building = building.borrow_mut();
            if building.contains(&id) {
                return Err(BuildError::Recursive(typename.to_string()));
            }
            building.push(id);
            Ok(BuildGuard(id))
        })
    }
}

impl Drop for BuildGuard {
    fn drop(&mut self) {
        BUILDING.with(|building| building.borrow_mut().retain(|id| *id != self.0));
    }
}

/// Codec for `S`, built on first use. Build errors are returned and
/// nothing is cached for the type. Threads racing on the first build all
/// get the codec that was cached first.
pub fn codec<S: Fields>() -> Result<Arc<Codec<S>>, BuildError> {
    let id = TypeId::of::<S>();

    let cached = CODECS
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .get(&id)
        .cloned();
    if let Some(Ok(codec)) = cached.map(|c| c.downcast::<Codec<S>>()) {
        return Ok(codec);
    }

    // Built without holding the lock: nested collection types recurse here.
    let codec = Arc::new(Codec::<S>::build()?);
    let cached = CODECS
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .entry(id)
        .or_insert_with(|| codec.clone() as Arc<dyn Any + Send + Sync>)
        .clone();
    Ok(cached.downcast::<Codec<S>>().unwrap_or(codec))
}

/// Encode `obj` into an attribute list.
pub fn encode<S: Fields>(obj: &S) -> Result<Attributes, CodecError> {
    Ok(codec::<S>()?.encode_attrs(obj))
}

/// Decode `obj` from an attribute list with default options.
pub fn decode<O: Object>(obj: &mut O, attrs: &[Attribute]) -> Result<(), CodecError> {
    Decoder::new(DecodeOptions::default()).decode(obj, attrs)
}

/// Attributes `S` knows about, in step order.
pub fn known_attrs<S: Fields>() -> Result<Vec<AttrInfo>, CodecError> {
    Ok(codec::<S>()?.known_attrs().to_vec())
}

/// Type name without its module path (`ippcodec::job::JobAttrs` -> `JobAttrs`).
pub fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let mut out = String::with_capacity(full.len());
    let mut word = String::new();
    for c in full.chars() {
        if c.is_alphanumeric() || c == '_' || c == ':' {
            word.push(c);
        } else {
            out.push_str(word.rsplit("::").next().unwrap_or_default());
            word.clear();
            out.push(c);
        }
    }
    out.push_str(word.rsplit("::").next().unwrap_or_default());
    out
}
