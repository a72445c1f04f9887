#[cfg(test)]
mod tests {
    use ki_keycode::Chord;
    use ki_mode::{Mode, WorkflowEvent};

    use crate::{
        EntityAction, Handler, Metadata, RemapConflict, RemapTable, Shortcut, ShortcutRegistry,
        parse_remap,
    };

    struct App(&'static str);

    impl EntityAction for App {
        fn name(&self) -> &str {
            self.0
        }

        fn dispatch_action(
            &self,
            _: &Mode,
            _: Option<&Chord>,
            _: &[WorkflowEvent],
        ) -> Option<bool> {
            None
        }
    }

    fn chord(s: &str) -> Chord {
        Chord::parse(s).unwrap()
    }

    fn app(key: &str, name: &'static str) -> Shortcut {
        Shortcut::new(
            chord(key),
            Handler::entity(App(name)),
            Metadata::new("Entities", name),
        )
    }

    fn registry() -> ShortcutRegistry {
        let mut reg = ShortcutRegistry::new();
        reg.register(
            &Mode::entity(),
            vec![app("s", "Safari"), app("p", "Spotify"), app("m", "Mail")],
        );
        reg.register(
            &Mode::normal(),
            vec![Shortcut::new(
                chord("cmd+n"),
                Handler::callback(|_, _| None),
                Metadata::new("File", "New"),
            )],
        );
        reg
    }

    fn entity_at(reg: &ShortcutRegistry, key: &str) -> Option<String> {
        reg.lookup(&Mode::entity(), &chord(key))
            .and_then(|s| s.entity_name().map(str::to_string))
    }

    #[test]
    fn rebind_by_metadata() {
        let mut reg = registry();
        let report = reg.remap(&RemapTable::new().bind("File", "New", chord("cmd+shift+n")));
        assert_eq!(report.remapped, 1);
        assert!(report.conflicts.is_empty());
        assert!(reg.lookup(&Mode::normal(), &chord("cmd+n")).is_none());
        assert!(reg.lookup(&Mode::normal(), &chord("cmd+shift+n")).is_some());
    }

    #[test]
    fn rebind_by_mode_and_entity_name() {
        let mut reg = registry();
        let report = reg.remap(&RemapTable::new().bind("entity", "Mail", chord("cmd+m")));
        assert_eq!(report.remapped, 1);
        assert_eq!(entity_at(&reg, "cmd+m").as_deref(), Some("Mail"));
        assert_eq!(entity_at(&reg, "m"), None);
        // Slot order is untouched.
        let names: Vec<_> = reg
            .shortcuts(&Mode::entity())
            .iter()
            .filter_map(|s| s.entity_name())
            .collect();
        assert_eq!(names, vec!["Safari", "Spotify", "Mail"]);
    }

    #[test]
    fn unmap_compacts_the_list() {
        let mut reg = registry();
        let table = parse_remap(r#"{"Entities": {"Spotify": unmap}}"#).unwrap();
        let report = reg.remap(&table);
        assert_eq!(report.unmapped, 1);
        let list = reg.shortcuts(&Mode::entity());
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].entity_name(), Some("Mail"));
        assert_eq!(entity_at(&reg, "p"), None);
    }

    #[test]
    fn unmatched_entries_are_reported() {
        let mut reg = registry();
        let report = reg.remap(
            &RemapTable::new()
                .bind("Entities", "Notes", chord("n"))
                .unmap("volume", "Mute"),
        );
        assert_eq!(report.remapped + report.unmapped, 0);
        assert_eq!(
            report.unmatched,
            vec![
                ("Entities".to_string(), "Notes".to_string()),
                ("volume".to_string(), "Mute".to_string()),
            ]
        );
    }

    #[test]
    fn remap_onto_occupied_key_keeps_both_and_last_wins() {
        // Spotify moves onto "s", still held by Safari, with no unmap for
        // Safari. Both stay registered; lookup returns the later slot.
        let mut reg = registry();
        let table = parse_remap(r#"{"Entities": {"Spotify": key("s")}}"#).unwrap();
        let report = reg.remap(&table);

        assert_eq!(report.remapped, 1);
        assert_eq!(
            report.conflicts,
            vec![RemapConflict {
                mode: Mode::entity(),
                chord: chord("s"),
                shadowed: "Safari".into(),
                winner: "Spotify".into(),
            }]
        );
        let on_s: Vec<_> = reg
            .shortcuts(&Mode::entity())
            .iter()
            .filter(|s| s.chord() == &chord("s"))
            .filter_map(|s| s.entity_name())
            .collect();
        assert_eq!(on_s, vec!["Safari", "Spotify"]);
        assert_eq!(entity_at(&reg, "s").as_deref(), Some("Spotify"));
    }

    #[test]
    fn remap_earlier_slot_onto_later_one_shadows_itself() {
        let mut reg = registry();
        let report = reg.remap(&RemapTable::new().bind("Entities", "Safari", chord("m")));
        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].winner, "Mail");
        assert_eq!(entity_at(&reg, "m").as_deref(), Some("Mail"));
    }

    #[test]
    fn unmapping_the_occupant_avoids_the_conflict() {
        let mut reg = registry();
        let table = parse_remap(r#"{"Entities": {"Spotify": key("s"), "Safari": unmap}}"#).unwrap();
        let report = reg.remap(&table);
        assert!(report.conflicts.is_empty());
        assert_eq!(entity_at(&reg, "s").as_deref(), Some("Spotify"));
        assert_eq!(reg.shortcuts(&Mode::entity()).len(), 2);
    }
}
