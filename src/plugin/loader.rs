//! Validation of deployed units and instantiation by type name.

use super::catalog::PluginUnit;
use super::domain::{Capability, DiscoveryPolicy, PluginError, PluginFactory, PluginResult};
use super::table::PluginTable;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, error, warn};

struct LoadedType<C: Capability> {
    unit: String,
    factory: PluginFactory<C>,
}

/// Loader for one capability's implementations.
///
/// The loaded-type table is written once per load pass and read on every
/// instantiation.
pub struct PluginLoader<C: Capability> {
    table: PluginTable<C>,
    loaded: RwLock<HashMap<String, LoadedType<C>>>,
}

impl<C: Capability> PluginLoader<C> {
    /// Creates a loader over a populated registration table.
    #[must_use]
    pub fn new(table: PluginTable<C>) -> Self {
        Self {
            table,
            loaded: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the registration table.
    #[must_use]
    pub const fn table(&self) -> &PluginTable<C> {
        &self.table
    }

    /// Loads the implementations shipped by the deployed `units`.
    ///
    /// Every unit is validated against the capability's policy before any
    /// type is recorded; a failing pass leaves the loaded table unchanged.
    /// Returns the type names recorded by this pass.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::NoImplementation`] or
    /// [`PluginError::AmbiguousImplementation`] when a unit violates an
    /// [`DiscoveryPolicy::ExactlyOnePerUnit`] policy, and
    /// [`PluginError::DuplicateType`] when a type is already loaded from a
    /// different unit.
    pub fn load(&self, units: &[PluginUnit]) -> PluginResult<Vec<String>> {
        let mut staged: Vec<(String, LoadedType<C>)> = Vec::new();
        for unit in units {
            let registrations = self.table.for_unit(unit.key());
            validate_policy::<C>(unit, &registrations)?;
            staged.extend(registrations.into_iter().map(|registration| {
                (
                    registration.type_name().to_owned(),
                    LoadedType {
                        unit: registration.unit().to_owned(),
                        factory: registration.factory(),
                    },
                )
            }));
        }

        let mut loaded = self.write_loaded()?;
        if let Some((type_name, _)) = staged.iter().find(|(type_name, candidate)| {
            loaded
                .get(type_name)
                .is_some_and(|existing| existing.unit != candidate.unit)
        }) {
            return Err(PluginError::DuplicateType {
                capability: C::NAME,
                type_name: type_name.clone(),
            });
        }

        let mut recorded = Vec::with_capacity(staged.len());
        for (type_name, entry) in staged {
            debug!(
                capability = C::NAME,
                plugin = %type_name,
                unit = %entry.unit,
                "loaded plugin type"
            );
            recorded.push(type_name.clone());
            loaded.insert(type_name, entry);
        }
        Ok(recorded)
    }

    /// Loads every unit present in the registration table.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_registered(&self) -> PluginResult<Vec<String>> {
        let units: Vec<PluginUnit> = self
            .table
            .unit_keys()
            .into_iter()
            .map(PluginUnit::builtin)
            .collect();
        self.load(&units)
    }

    /// Constructs the implementation of `type_name` for `descriptor`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::NotLoaded`] when no loaded unit provides the
    /// type, or the factory's own error.
    pub fn instantiate(
        &self,
        type_name: &str,
        descriptor: &C::Descriptor,
    ) -> PluginResult<Arc<C::Instance>> {
        let factory = {
            let loaded = self.read_loaded()?;
            let entry = loaded.get(type_name).ok_or_else(|| PluginError::NotLoaded {
                capability: C::NAME,
                type_name: type_name.to_owned(),
            })?;
            Arc::clone(&entry.factory)
        };
        factory(descriptor).inspect_err(|err| {
            error!(
                capability = C::NAME,
                plugin = type_name,
                error = %err,
                "plugin instantiation failed"
            );
        })
    }

    /// Returns whether `type_name` is loaded.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Lock`] when loader state is unavailable.
    pub fn is_loaded(&self, type_name: &str) -> PluginResult<bool> {
        Ok(self.read_loaded()?.contains_key(type_name))
    }

    /// Returns the loaded type names, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Lock`] when loader state is unavailable.
    pub fn loaded_types(&self) -> PluginResult<Vec<String>> {
        let mut names: Vec<String> = self.read_loaded()?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Forgets every loaded type. Intended for tests.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Lock`] when loader state is unavailable.
    pub fn reset(&self) -> PluginResult<()> {
        self.write_loaded()?.clear();
        Ok(())
    }

    fn read_loaded(
        &self,
    ) -> PluginResult<std::sync::RwLockReadGuard<'_, HashMap<String, LoadedType<C>>>> {
        self.loaded
            .read()
            .map_err(|err| PluginError::Lock(err.to_string()))
    }

    fn write_loaded(
        &self,
    ) -> PluginResult<std::sync::RwLockWriteGuard<'_, HashMap<String, LoadedType<C>>>> {
        self.loaded
            .write()
            .map_err(|err| PluginError::Lock(err.to_string()))
    }
}

impl<C: Capability> std::fmt::Debug for PluginLoader<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginLoader")
            .field("capability", &C::NAME)
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

fn validate_policy<C: Capability>(
    unit: &PluginUnit,
    registrations: &[&super::table::PluginRegistration<C>],
) -> PluginResult<()> {
    match (C::POLICY, registrations.len()) {
        (DiscoveryPolicy::ExactlyOnePerUnit, 0) => {
            error!(
                capability = C::NAME,
                unit = unit.key(),
                "plugin unit provides no implementation"
            );
            Err(PluginError::NoImplementation {
                capability: C::NAME,
                unit: unit.key().to_owned(),
            })
        }
        (DiscoveryPolicy::ExactlyOnePerUnit, 1) | (DiscoveryPolicy::Unrestricted, 1..) => Ok(()),
        (DiscoveryPolicy::ExactlyOnePerUnit, _) => {
            let types: Vec<String> = registrations
                .iter()
                .map(|registration| registration.type_name().to_owned())
                .collect();
            error!(
                capability = C::NAME,
                unit = unit.key(),
                ?types,
                "plugin unit is ambiguous"
            );
            Err(PluginError::AmbiguousImplementation {
                capability: C::NAME,
                unit: unit.key().to_owned(),
                types,
            })
        }
        (DiscoveryPolicy::Unrestricted, 0) => {
            warn!(
                capability = C::NAME,
                unit = unit.key(),
                "plugin unit provides no implementation"
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct Fixed(String);

    impl Greeter for Fixed {
        fn greet(&self) -> String {
            self.0.clone()
        }
    }

    struct Exclusive;

    impl Capability for Exclusive {
        type Descriptor = String;
        type Instance = dyn Greeter;
        const NAME: &'static str = "greeter";
        const POLICY: DiscoveryPolicy = DiscoveryPolicy::ExactlyOnePerUnit;
    }

    struct Shared;

    impl Capability for Shared {
        type Descriptor = String;
        type Instance = dyn Greeter;
        const NAME: &'static str = "shared greeter";
        const POLICY: DiscoveryPolicy = DiscoveryPolicy::Unrestricted;
    }

    fn factory<C>(prefix: &'static str) -> PluginFactory<C>
    where
        C: Capability<Descriptor = String, Instance = dyn Greeter>,
    {
        Arc::new(move |descriptor: &String| {
            Ok(Arc::new(Fixed(format!("{prefix} {descriptor}"))) as Arc<dyn Greeter>)
        })
    }

    #[fixture]
    fn exclusive_table() -> PluginTable<Exclusive> {
        let mut table = PluginTable::new();
        table
            .register("hello", "hello", factory::<Exclusive>("hello"))
            .expect("register hello");
        table
            .register("multi", "first", factory::<Exclusive>("first"))
            .expect("register first");
        table
            .register("multi", "second", factory::<Exclusive>("second"))
            .expect("register second");
        table
    }

    #[rstest]
    fn duplicate_type_names_are_rejected(mut exclusive_table: PluginTable<Exclusive>) {
        let result = exclusive_table.register("other", "hello", factory::<Exclusive>("x"));

        assert!(matches!(result, Err(PluginError::DuplicateType { .. })));
        assert_eq!(exclusive_table.len(), 3);
    }

    #[rstest]
    fn exclusive_units_load_and_instantiate(exclusive_table: PluginTable<Exclusive>) {
        let loader = PluginLoader::new(exclusive_table);

        let recorded = loader
            .load(&[PluginUnit::builtin("hello")])
            .expect("single implementation loads");
        let greeter = loader
            .instantiate("hello", &"world".to_owned())
            .expect("instantiation succeeds");

        assert_eq!(recorded, ["hello"]);
        assert_eq!(greeter.greet(), "hello world");
    }

    #[rstest]
    #[case("multi", true)]
    #[case("empty", false)]
    fn exclusive_policy_rejects_ambiguous_and_empty_units(
        exclusive_table: PluginTable<Exclusive>,
        #[case] unit: &str,
        #[case] ambiguous: bool,
    ) {
        let loader = PluginLoader::new(exclusive_table);
        let units = [PluginUnit::builtin("hello"), PluginUnit::builtin(unit)];

        let result = loader.load(&units);

        if ambiguous {
            assert!(matches!(
                result,
                Err(PluginError::AmbiguousImplementation { ref types, .. }) if types.len() == 2
            ));
        } else {
            assert!(matches!(result, Err(PluginError::NoImplementation { .. })));
        }
        assert!(!loader.is_loaded("hello").expect("state readable"));
    }

    #[test]
    fn unrestricted_policy_accepts_any_count() {
        let mut table = PluginTable::<Shared>::new();
        table
            .register("bundle", "alpha", factory::<Shared>("a"))
            .expect("register alpha");
        table
            .register("bundle", "beta", factory::<Shared>("b"))
            .expect("register beta");
        let loader = PluginLoader::new(table);

        loader
            .load(&[PluginUnit::builtin("bundle"), PluginUnit::builtin("empty")])
            .expect("unrestricted units load");

        assert_eq!(
            loader.loaded_types().expect("state readable"),
            ["alpha", "beta"]
        );
    }

    #[rstest]
    fn reset_forgets_loaded_types(exclusive_table: PluginTable<Exclusive>) {
        let loader = PluginLoader::new(exclusive_table);
        loader
            .load(&[PluginUnit::builtin("hello")])
            .expect("load succeeds");

        loader.reset().expect("reset succeeds");

        assert!(matches!(
            loader.instantiate("hello", &"x".to_owned()),
            Err(PluginError::NotLoaded { .. })
        ));
    }

    #[test]
    fn load_registered_covers_every_unit() {
        let mut table = PluginTable::<Exclusive>::new();
        table
            .register("one", "one", factory::<Exclusive>("1"))
            .expect("register one");
        table
            .register("two", "two", factory::<Exclusive>("2"))
            .expect("register two");
        let loader = PluginLoader::new(table);

        let recorded = loader.load_registered().expect("all units load");

        assert_eq!(recorded, ["one", "two"]);
    }
}
