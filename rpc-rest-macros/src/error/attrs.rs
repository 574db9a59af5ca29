use syn::spanned::Spanned;

#[derive(Debug)]
pub struct FinalProcedureErrorAttrs {
    pub code: String,
    pub status: u16,
    pub delegate_to_child: bool,
}

#[derive(Debug, Default)]
pub struct ProcedureErrorAttrs {
    attr_tok: Option<syn::Attribute>,
    inner_tok: Option<syn::Path>,
    code: Option<syn::LitStr>,
    status: Option<syn::LitInt>,
}

impl ProcedureErrorAttrs {
    pub fn finalise(self) -> syn::Result<FinalProcedureErrorAttrs> {
        if let Some(inner) = &self.inner_tok {
            if self.code.is_some() || self.status.is_some() {
                return Err(syn::Error::new_spanned(
                    inner,
                    "'inner' does not make sense alongside 'code' or 'status'",
                ));
            }
            return Ok(FinalProcedureErrorAttrs {
                code: String::new(),
                status: 0,
                delegate_to_child: true,
            });
        }

        let attr_span = self
            .attr_tok
            .as_ref()
            .map(|a| a.span())
            .unwrap_or_else(proc_macro2::Span::call_site);
        let code = match self.code {
            Some(code) => code.value(),
            None => {
                return Err(syn::Error::new(
                    attr_span,
                    "One of '#[procedure_error(code = \"...\", status = ...)]' or \
                     '#[procedure_error(inner)]' is required",
                ))
            }
        };
        let status = match self.status {
            Some(status) => status.base10_parse::<u16>()?,
            None => 500,
        };

        Ok(FinalProcedureErrorAttrs {
            code,
            status,
            delegate_to_child: false,
        })
    }

    pub fn finalise_with_parent_attrs(
        mut self,
        parent: &ProcedureErrorAttrs,
    ) -> syn::Result<FinalProcedureErrorAttrs> {
        if let Some(t) = &parent.inner_tok {
            return Err(syn::Error::new_spanned(
                t,
                "'inner' is not allowed at the top level of an enum, only on specific variants",
            ));
        }
        // A variant that delegates to its inner error ignores the enum's own
        // code/status entirely, so don't inherit them here - doing so would
        // make `finalise` see a spurious code/status alongside `inner` and
        // reject a variant that never declared one itself.
        if self.inner_tok.is_none() {
            if self.code.is_none() {
                self.code = parent.code.clone();
            }
            if self.status.is_none() {
                self.status = parent.status.clone();
            }
        }
        self.finalise()
    }

    pub fn parse(attrs: &[syn::Attribute]) -> syn::Result<ProcedureErrorAttrs> {
        let mut out = ProcedureErrorAttrs::default();

        for attr in attrs {
            if !attr.path.is_ident("procedure_error") {
                continue;
            }
            out.attr_tok = Some(attr.clone());

            let meta_list = match attr.parse_meta()? {
                syn::Meta::List(list) => list,
                bad => return Err(syn::Error::new_spanned(bad, "unrecognized attribute")),
            };

            for item in meta_list.nested {
                let meta = match item {
                    syn::NestedMeta::Meta(meta) => meta,
                    bad => return Err(syn::Error::new_spanned(bad, "unrecognized attribute")),
                };

                match meta {
                    syn::Meta::Path(path) => {
                        if path.is_ident("inner") {
                            out.inner_tok = Some(path);
                        } else {
                            return Err(syn::Error::new_spanned(path, "unrecognized attribute"));
                        }
                    }
                    syn::Meta::NameValue(name_value) => {
                        if name_value.path.is_ident("code") {
                            out.code = Some(match name_value.lit {
                                syn::Lit::Str(s) => s,
                                bad => {
                                    return Err(syn::Error::new_spanned(
                                        bad,
                                        "string literal required here",
                                    ))
                                }
                            });
                        } else if name_value.path.is_ident("status") {
                            out.status = Some(match name_value.lit {
                                syn::Lit::Int(i) => i,
                                bad => {
                                    return Err(syn::Error::new_spanned(
                                        bad,
                                        "u16 integer literal required here",
                                    ))
                                }
                            });
                        } else {
                            return Err(syn::Error::new_spanned(
                                name_value,
                                "unrecognized attribute",
                            ));
                        }
                    }
                    bad => return Err(syn::Error::new_spanned(bad, "unrecognized attribute")),
                }
            }
        }

        Ok(out)
    }
}
