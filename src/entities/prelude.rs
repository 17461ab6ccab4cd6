pub use super::greeks_data::Entity as GreeksData;
pub use super::iv_evolution::Entity as IvEvolution;
pub use super::options_data::Entity as OptionsData;
