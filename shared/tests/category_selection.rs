use crux_core::testing::AppTester;
use proptest::prelude::*;

use promptgen_shared::{App, Category, Effect, Event, Model};

#[derive(Debug, Clone, Copy)]
enum Click {
    Toggle(Category),
    Remove(Category),
    Picker,
}

fn any_category() -> impl Strategy<Value = Category> {
    (0..Category::ALL.len()).prop_map(|i| Category::ALL[i])
}

fn any_click() -> impl Strategy<Value = Click> {
    prop_oneof![
        4 => any_category().prop_map(Click::Toggle),
        2 => any_category().prop_map(Click::Remove),
        1 => Just(Click::Picker),
    ]
}

fn to_event(click: Click) -> Event {
    match click {
        Click::Toggle(c) => Event::CategoryToggled(c),
        Click::Remove(c) => Event::CategoryRemoved(c),
        Click::Picker => Event::CategoryPickerToggled,
    }
}

#[test]
fn picker_view_reflects_selection() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(Event::CategoryPickerToggled, &mut model);
    app.update(Event::CategoryToggled(Category::ResourceExhaustion), &mut model);
    app.update(Event::CategoryToggled(Category::PromptInjection), &mut model);

    let view = app.view(&model);
    assert!(view.form.picker_open);
    assert_eq!(
        view.form.selected_categories,
        vec!["Resource Exhaustion", "Prompt Injection"]
    );
    let selected: Vec<_> = view
        .form
        .picker_options
        .iter()
        .filter(|o| o.selected)
        .map(|o| o.label.as_str())
        .collect();
    // Options keep vocabulary order regardless of click order.
    assert_eq!(selected, vec!["Prompt Injection", "Resource Exhaustion"]);
}

#[test]
fn removing_an_unselected_category_changes_nothing() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    app.update(Event::CategoryToggled(Category::LogicFlaws), &mut model);
    let before = model.clone();

    let update = app.update(Event::CategoryRemoved(Category::CodeInjection), &mut model);

    assert!(update.effects.is_empty());
    assert_eq!(model, before);
}

proptest! {
    #[test]
    fn selection_matches_click_history(clicks in proptest::collection::vec(any_click(), 0..48)) {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();

        let mut expected: Vec<Category> = Vec::new();
        let mut open = false;
        for click in &clicks {
            app.update(to_event(*click), &mut model);
            match *click {
                Click::Toggle(c) => match expected.iter().position(|e| *e == c) {
                    Some(i) => { expected.remove(i); }
                    None => expected.push(c),
                },
                Click::Remove(c) => expected.retain(|e| *e != c),
                Click::Picker => open = !open,
            }
        }

        prop_assert_eq!(model.form.categories.selected(), expected.as_slice());
        prop_assert_eq!(model.form.categories.is_open(), open);
    }

    #[test]
    fn remove_twice_is_idempotent(
        toggles in proptest::collection::vec(any_category(), 0..24),
        target in any_category(),
    ) {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();
        for c in toggles {
            app.update(Event::CategoryToggled(c), &mut model);
        }

        app.update(Event::CategoryRemoved(target), &mut model);
        let after_first = model.form.categories.len();
        app.update(Event::CategoryRemoved(target), &mut model);

        prop_assert_eq!(model.form.categories.len(), after_first);
        prop_assert!(!model.form.categories.contains(target));
    }
}
