//! Browser runtime shipped with every compiled document

/// Defines `NotaComponent`, the `nota_elements` table and the `nota` helpers
/// used by generated scripts.
pub const RUNTIME_JS: &str = r#"const nota_elements = {};

class NotaComponent {
  constructor(el, config) {
    this.el = el;
    this.config = config || {};
    this.baseStyle = el ? el.getAttribute('style') || '' : '';
    this.current = null;
    this.setupEvents();
  }

  setupEvents() {
    if (!this.el || !this.config.states) return;
    this.config.states.forEach((state) => {
      if (!state.when) return;
      this.el.addEventListener(state.when, () => this.setState(state.name));
      if (state.when === 'mouseenter') {
        this.el.addEventListener('mouseleave', () => this.reset());
      }
    });
  }

  setState(name) {
    const state = (this.config.states || []).find((s) => s.name === name);
    if (!state) return;
    this.reset();
    Object.entries(state.style || {}).forEach(([key, value]) => {
      this.el.style.setProperty(key, value);
    });
    this.current = name;
  }

  reset() {
    this.el.setAttribute('style', this.baseStyle);
    this.current = null;
  }
}

const nota = {
  delegate(id, events, target) {
    const el = document.getElementById(id);
    if (!el) return;
    const resolve = () => {
      if (target === 'parent') return el.parentElement;
      return document.getElementById(target) || (nota_elements[target] && nota_elements[target].el);
    };
    events.forEach((event) => {
      el.addEventListener(event, (e) => {
        const destination = resolve();
        if (destination && destination !== el) {
          destination.dispatchEvent(new e.constructor(e.type, e));
        }
      });
    });
  },
};
"#;

/// Normalizes the `when:` value of a state to a DOM event name
pub fn state_event(when: &str) -> &str {
    crate::core::constants::dom_event_name(when.trim_matches(|c| c == '"' || c == '\''))
}
