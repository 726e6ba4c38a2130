/// Changes to a model that invalidate some of its derived data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelAction {
    TransposeLp,
    ScaleLp,
    ShuffleLp,
    NewCosts,
    NewBounds,
    NewBasis,
    NewCols,
    NewRows,
    DelCols,
    DelRows,

    /// Rows were deleted, but only rows whose slacks were basic.
    DelRowsBasisOk,
}

/// Validity of the data a [`SimplexModel`](crate::model::SimplexModel) derives
/// from its LP.
///
/// The flags are only changed through [`ModelFlags::apply`], which clears what
/// an action invalidates, and the `mark_*` methods, which record that a piece of
/// data was just computed. Only the crate may mark data as computed:
///
/// ```compile_fail
/// let mut flags = dualplex::ModelFlags::new();
/// flags.mark_invert(true);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelFlags {
    have_solver_lp: bool,
    transposed_lp: bool,
    scaled_lp: bool,
    shuffled_lp: bool,
    have_basis: bool,
    have_matrix_col_wise: bool,
    have_matrix_row_wise: bool,
    have_factor_arrays: bool,
    have_edge_weights: bool,
    have_invert: bool,
    have_fresh_invert: bool,
    have_nonbasic_duals: bool,
    have_basic_primals: bool,
    have_fresh_rebuild: bool,
    have_ranging_data: bool,
    have_saved_bounds: bool,
}

macro_rules! flag_accessors {
    ($($flag:ident => $mark:ident,)+) => {
        $(
            #[inline]
            pub fn $flag(&self) -> bool {
                self.$flag
            }

            #[inline]
            pub(crate) fn $mark(&mut self, value: bool) {
                self.$flag = value;
            }
        )+
    };
}

impl ModelFlags {
    pub fn new() -> Self {
        Default::default()
    }

    flag_accessors! {
        have_solver_lp => mark_solver_lp,
        transposed_lp => mark_transposed_lp,
        scaled_lp => mark_scaled_lp,
        shuffled_lp => mark_shuffled_lp,
        have_basis => mark_basis,
        have_matrix_col_wise => mark_matrix_col_wise,
        have_matrix_row_wise => mark_matrix_row_wise,
        have_factor_arrays => mark_factor_arrays,
        have_edge_weights => mark_edge_weights,
        have_invert => mark_invert,
        have_fresh_invert => mark_fresh_invert,
        have_nonbasic_duals => mark_nonbasic_duals,
        have_basic_primals => mark_basic_primals,
        have_fresh_rebuild => mark_fresh_rebuild,
        have_ranging_data => mark_ranging_data,
        have_saved_bounds => mark_saved_bounds,
    }

    pub fn apply(&mut self, action: ModelAction) {
        match action {
            ModelAction::TransposeLp => {
                self.transposed_lp = true;
                self.have_basis = false;
                self.clear_matrix();
                self.clear_factor();
                self.clear_solution();
            }

            ModelAction::ScaleLp => {
                self.scaled_lp = true;
                self.clear_matrix();
                self.clear_factor();
                self.clear_solution();
            }

            ModelAction::ShuffleLp => {
                self.shuffled_lp = true;
                self.have_basis = false;
                self.clear_matrix();
                self.clear_factor();
                self.clear_solution();
            }

            ModelAction::NewCosts => {
                //the costs of a transposed lp are its row bounds, and vice versa
                if self.transposed_lp {
                    self.clear_solver_lp();
                }

                self.have_nonbasic_duals = false;
                self.have_fresh_rebuild = false;
                self.have_ranging_data = false;
            }

            ModelAction::NewBounds => {
                if self.transposed_lp {
                    self.clear_solver_lp();
                }

                self.have_basic_primals = false;
                self.have_fresh_rebuild = false;
                self.have_ranging_data = false;
            }

            ModelAction::NewBasis => {
                self.have_basis = true;
                self.have_matrix_row_wise = false;
                self.clear_factor();
                self.clear_solution();
            }

            ModelAction::NewCols | ModelAction::NewRows | ModelAction::DelCols => {
                self.clear_solver_lp();
            }

            ModelAction::DelRows => {
                self.clear_solver_lp();
                self.have_basis = false;
            }

            ModelAction::DelRowsBasisOk => {
                self.clear_solver_lp();
            }
        }
    }

    fn clear_solver_lp(&mut self) {
        self.have_solver_lp = false;
        self.transposed_lp = false;
        self.scaled_lp = false;
        self.shuffled_lp = false;
        self.clear_matrix();
        self.have_factor_arrays = false;
        self.clear_factor();
        self.clear_solution();
    }

    fn clear_matrix(&mut self) {
        self.have_matrix_col_wise = false;
        self.have_matrix_row_wise = false;
    }

    fn clear_factor(&mut self) {
        self.have_invert = false;
        self.have_fresh_invert = false;
        self.have_edge_weights = false;
    }

    fn clear_solution(&mut self) {
        self.have_nonbasic_duals = false;
        self.have_basic_primals = false;
        self.have_fresh_rebuild = false;
        self.have_ranging_data = false;
    }
}
