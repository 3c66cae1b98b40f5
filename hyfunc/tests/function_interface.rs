use bit_set::BitSet;

use hyfunc::prelude::*;

fn i32() -> Type {
    IType::I32.into()
}

fn f64() -> Type {
    FType::Fp64.into()
}

fn entry_types(function: &dyn FunctionLike) -> Vec<Type> {
    function.arguments().iter().map(|arg| arg.ty().clone()).collect()
}

fn bits(indices: &[usize]) -> BitSet {
    indices.iter().copied().collect()
}

fn dict(key: &str, value: impl Into<Attribute>) -> AttrDict {
    let value: Attribute = value.into();
    [(key, value)].into_iter().collect()
}

#[test]
fn entry_block_matches_inputs() {
    let loc = Location::file_line_col("lib.hy", 3, 1);
    let mut func = Func::new("pair", FunctionType::new([i32(), f64()], [])).with_location(loc.clone());
    assert!(func.is_external());
    assert!(func.callable_region().is_none());

    let entry = func.add_entry_block().unwrap();
    assert!(!func.is_external());
    assert_eq!(func.body().entry_id(), Some(entry));
    assert_eq!(entry_types(&func), vec![i32(), f64()]);
    assert!(func.arguments().iter().all(|arg| arg.location() == &loc));
    assert!(func.arguments().iter().all(|arg| arg.owner() == entry));

    let err = func.add_entry_block().unwrap_err();
    assert!(err.is_entry_block_already_exists());
    assert_eq!(func.body().len(), 1);
}

#[test]
fn add_block_requires_entry_block() {
    let mut func = Func::new("blocks", FunctionType::new([i32()], [i32()]));
    assert!(func.add_block().unwrap_err().is_missing_entry_block());

    let entry = func.add_entry_block().unwrap();
    let second = func.add_block().unwrap();
    let third = func.add_block().unwrap();
    assert_eq!(func.body().block_ids(), &[entry, second, third]);
    assert_eq!(func.body().block(second).unwrap().num_arguments(), 0);
    assert_eq!(func.body().last_block().map(|b| b.id()), Some(third));
}

#[test]
fn erase_body_makes_function_external() {
    let mut func = Func::with_entry_block("body", FunctionType::new([i32()], [i32()]), Location::Unknown);
    let entry = func.body().entry_id().unwrap();
    let exit = func.add_block().unwrap();
    let arg = func.arguments()[0].id();
    func.body_mut()
        .append_operation(entry, OperationState::new("cf.br").operands([arg]).successors([exit]))
        .unwrap();

    func.erase_body();
    assert!(func.is_external());
    assert!(func.entry_block().is_none());
    assert!(func.arguments().is_empty());
    assert!(func.verify_body().is_ok());

    // The body can be defined again
    func.add_entry_block().unwrap();
    assert_eq!(entry_types(&func), vec![i32()]);
}

#[test]
fn block_walks_are_restartable() {
    let mut func = Func::with_entry_block("walk", FunctionType::new([], []), Location::Unknown);
    let ids: Vec<_> = std::iter::once(func.body().entry_id().unwrap())
        .chain((0..3).map(|_| func.add_block().unwrap()))
        .collect();

    let forward = func.body().walk(WalkOrder::Forward);
    let restarted = forward.clone();
    assert_eq!(forward.map(|b| b.id()).collect::<Vec<_>>(), ids);
    assert_eq!(restarted.map(|b| b.id()).collect::<Vec<_>>(), ids);

    let reverse: Vec<_> = func.body().walk(WalkOrder::Reverse).map(|b| b.id()).collect();
    assert_eq!(reverse, ids.iter().rev().copied().collect::<Vec<_>>());
}

#[test]
fn insert_then_verify_grows_arity() {
    let mut func = Func::with_entry_block("grow", FunctionType::new([i32()], [i32()]), Location::Unknown);
    let types = [f64(), PtrType.into(), IndexType.into()];
    func.insert_arguments(&[0, 1, 1], &types, &[], &[]).unwrap();

    assert_eq!(func.num_arguments(), 4);
    assert_eq!(
        func.argument_types(),
        &[f64(), i32(), PtrType.into(), IndexType.into()]
    );
    assert_eq!(entry_types(&func), func.argument_types().to_vec());
    assert!(func.verify_body().is_ok());
    // No dictionaries were given and none existed
    assert!(func.arg_attr_dicts().is_empty());
}

#[test]
fn inserted_arguments_take_given_locations() {
    let fn_loc = Location::file_line_col("lib.hy", 1, 1);
    let arg_loc = Location::file_line_col("lib.hy", 1, 12);
    let mut func = Func::with_entry_block("locs", FunctionType::new([i32()], []), fn_loc.clone());

    func.insert_arguments(&[1], &[f64()], &[], &[arg_loc.clone()]).unwrap();
    func.insert_arguments(&[0], &[f64()], &[], &[]).unwrap();
    let locs: Vec<_> = func.arguments().iter().map(|arg| arg.location().clone()).collect();
    assert_eq!(locs, vec![fn_loc.clone(), fn_loc, arg_loc]);
}

#[test]
fn insert_rejects_bad_input_without_changes() {
    let mut func = Func::with_entry_block("strict", FunctionType::new([i32(), i32()], []), Location::Unknown);
    func.set_arg_attr(1, "llvm.noundef", Attribute::Unit).unwrap();
    let before = func.clone();

    let err = func.insert_arguments(&[2, 0], &[f64(), f64()], &[], &[]).unwrap_err();
    assert!(err.is_unsorted_indices());

    let err = func.insert_arguments(&[3], &[f64()], &[], &[]).unwrap_err();
    assert_eq!(
        err,
        Error::IndexOutOfRange {
            function: "strict".to_string(),
            slot: SignatureSlot::Argument,
            index: 3,
            count: 2,
        }
    );

    let err = func.insert_arguments(&[0, 1], &[f64()], &[], &[]).unwrap_err();
    assert!(err.is_length_mismatch());
    let err = func
        .insert_arguments(&[0], &[f64()], &[AttrDict::new(), AttrDict::new()], &[])
        .unwrap_err();
    assert!(err.is_length_mismatch());

    assert_eq!(func.function_type(), before.function_type());
    assert_eq!(func.arg_attr_dicts(), before.arg_attr_dicts());
    assert_eq!(entry_types(&func), entry_types(&before));
}

#[test]
fn insert_at_count_appends() {
    let mut func = Func::new("append", FunctionType::new([i32()], [i32()]));
    func.insert_argument(1, f64(), AttrDict::new(), Location::Unknown).unwrap();
    func.insert_result(1, f64(), AttrDict::new()).unwrap();
    assert_eq!(func.function_type().to_string(), "(i32, f64) -> (i32, f64)");
}

#[test]
fn erase_then_reinsert_restores_inputs() {
    let inputs = [i32(), f64(), PtrType.into(), IType::I8.into()];
    let mut func = Func::with_entry_block("cycle", FunctionType::new(inputs.clone(), []), Location::Unknown);

    func.erase_arguments(&bits(&[1, 3])).unwrap();
    assert_eq!(func.argument_types(), &[i32(), PtrType.into()]);
    assert_eq!(entry_types(&func), vec![i32(), PtrType.into()]);

    // Positions in the reduced signature
    func.insert_arguments(&[1, 2], &[f64(), IType::I8.into()], &[], &[])
        .unwrap();
    assert_eq!(func.argument_types(), &inputs);
    assert_eq!(entry_types(&func), inputs.to_vec());
    assert!(func.verify_body().is_ok());
}

#[test]
fn erase_rejects_out_of_range() {
    let mut func = Func::new("small", FunctionType::new([i32()], [i32()]));
    assert!(func.erase_arguments(&bits(&[0, 1])).unwrap_err().is_index_out_of_range());
    assert!(func.erase_result(1).unwrap_err().is_index_out_of_range());
    assert_eq!(func.num_arguments(), 1);
    assert_eq!(func.num_results(), 1);
}

#[test]
fn erase_rejects_used_arguments() {
    let mut func = Func::with_entry_block("used", FunctionType::new([i32(), i32()], [i32()]), Location::Unknown);
    let entry = func.body().entry_id().unwrap();
    let used = func.arguments()[1].id();
    func.body_mut()
        .append_operation(entry, OperationState::new("func.return").operands([used]))
        .unwrap();

    let err = func.erase_argument(1).unwrap_err();
    assert_eq!(
        err,
        Error::ArgumentInUse {
            function: "used".to_string(),
            index: 1,
        }
    );
    assert_eq!(func.num_arguments(), 2);

    func.erase_argument(0).unwrap();
    assert_eq!(func.arguments()[0].id(), used);
    assert!(func.verify_body().is_ok());
}

#[test]
fn entry_arity_mismatch_is_reported() {
    let mut func = Func::with_entry_block("wide", FunctionType::new([i32(), f64()], []), Location::Unknown);
    let entry = func.body().entry_id().unwrap();
    func.body_mut().add_argument(entry, i32(), Location::Unknown).unwrap();

    let err = func.verify_body().unwrap_err();
    assert_eq!(
        err,
        Error::EntryBlockArgCount {
            function: "wide".to_string(),
            expected: 2,
            found: 3,
        }
    );
}

#[test]
fn entry_type_mismatch_is_reported() {
    let mut func = Func::with_entry_block("typed", FunctionType::new([i32(), f64()], []), Location::Unknown);
    func.set_type(FunctionType::new([i32(), FType::Fp32.into()], []));

    let err = func.verify_body().unwrap_err();
    assert_eq!(
        err,
        Error::EntryBlockArgType {
            function: "typed".to_string(),
            index: 1,
            expected: FType::Fp32.into(),
            found: f64(),
        }
    );
}

#[test]
fn set_type_only_touches_the_signature() {
    let mut func = Func::with_entry_block("raw", FunctionType::new([i32()], []), Location::Unknown);
    func.set_arg_attr(0, "llvm.zeroext", Attribute::Unit).unwrap();

    func.set_type(FunctionType::new([i32(), i32()], []));
    assert_eq!(func.num_arguments(), 2);
    assert_eq!(func.arguments().len(), 1);
    assert_eq!(func.arg_attr_dicts().len(), 1);
    assert!(func.verify_body().unwrap_err().is_entry_block_arg_count());

    // The caller restores consistency
    let entry = func.body().entry_id().unwrap();
    func.body_mut().add_argument(entry, i32(), Location::Unknown).unwrap();
    assert!(func.verify_body().is_ok());
}

#[test]
fn attribute_follows_its_argument() {
    let mut func = Func::with_entry_block(
        "attrs",
        FunctionType::new([i32(), PtrType.into(), f64()], []),
        Location::Unknown,
    );
    func.set_arg_attr(1, "llvm.noalias", Attribute::Unit).unwrap();
    func.set_arg_attr(2, "llvm.align", Attribute::Int(8)).unwrap();

    func.erase_arguments(&bits(&[0])).unwrap();
    assert_eq!(func.arg_attr(0, "llvm.noalias").unwrap(), Some(&Attribute::Unit));
    assert_eq!(func.arg_attr(1, "llvm.align").unwrap(), Some(&Attribute::Int(8)));
    assert_eq!(func.arg_attr_dicts().len(), 2);

    func.insert_argument(0, i32(), dict("llvm.signext", true), Location::Unknown)
        .unwrap();
    assert_eq!(func.arg_attr(1, "llvm.noalias").unwrap(), Some(&Attribute::Unit));
    assert_eq!(func.arg_attr(0, "llvm.signext").unwrap(), Some(&Attribute::Bool(true)));
}

#[test]
fn missing_dictionary_reads_as_empty() {
    let mut func = Func::new("plain", FunctionType::new([i32(), i32()], [i32()]));
    assert_eq!(func.arg_attr(1, "llvm.noalias").unwrap(), None);
    assert!(func.arg_attr_dict(0).unwrap().is_empty());
    assert!(func.arg_attr(2, "llvm.noalias").unwrap_err().is_index_out_of_range());

    func.set_arg_attr(0, "llvm.noundef", Attribute::Unit).unwrap();
    assert_eq!(func.arg_attr(1, "llvm.noundef").unwrap(), None);
    assert!(func.result_attr_dicts().is_empty());
}

#[test]
fn empty_dictionaries_are_compacted() {
    let mut func = Func::new("compact", FunctionType::new([i32(), i32()], []));
    func.set_arg_attr_dict(1, dict("llvm.nonnull", Attribute::Unit)).unwrap();
    assert_eq!(func.arg_attr_dicts().len(), 2);

    assert_eq!(
        func.remove_arg_attr(1, "llvm.nonnull").unwrap(),
        Some(Attribute::Unit)
    );
    assert!(func.arg_attr_dicts().is_empty());
    assert_eq!(func.remove_arg_attr(1, "llvm.nonnull").unwrap(), None);

    func.set_arg_attr_dict(0, dict("llvm.inreg", Attribute::Unit)).unwrap();
    func.set_arg_attr_dict(0, AttrDict::new()).unwrap();
    assert!(func.arg_attr_dicts().is_empty());
}

#[test]
fn set_all_requires_one_dictionary_per_slot() {
    let mut func = Func::new("all", FunctionType::new([i32()], [i32(), i32()]));
    let err = func.set_all_result_attr_dicts(vec![AttrDict::new()]).unwrap_err();
    assert_eq!(
        err,
        Error::AttrCountMismatch {
            function: "all".to_string(),
            slot: SignatureSlot::Result,
            expected: 2,
            found: 1,
        }
    );

    func.set_all_result_attr_dicts(vec![AttrDict::new(), dict("llvm.noundef", Attribute::Unit)])
        .unwrap();
    assert_eq!(func.result_attr(1, "llvm.noundef").unwrap(), Some(&Attribute::Unit));

    func.set_all_result_attr_dicts(vec![AttrDict::new(), AttrDict::new()])
        .unwrap();
    assert!(func.result_attr_dicts().is_empty());
}

#[test]
fn inserting_a_result_leaves_the_body_alone() {
    let mut foo = Func::new("foo", FunctionType::new([i32()], [i32()]));
    foo.add_entry_block().unwrap();
    let before: Vec<_> = foo.arguments().to_vec();

    foo.insert_results(&[1], &[i32()], &[AttrDict::new()]).unwrap();
    assert_eq!(foo.function_type().to_string(), "(i32) -> (i32, i32)");
    assert_eq!(foo.result_attr_dicts().len(), 2);
    assert_eq!(foo.arguments(), before.as_slice());
    assert!(foo.verify_body().is_ok());
}

#[test]
fn derived_signatures_leave_the_function_alone() {
    let ty = FunctionType::new([i32(), f64()], [i32()])
        .with_cconv(CallingConvention::FastC)
        .with_variadic(true);
    let func = Func::new("derive", ty.clone());

    let wider = func
        .type_with_args_and_results(&[0], &[PtrType.into()], &[1], &[f64()])
        .unwrap();
    assert_eq!(wider.inputs(), &[PtrType.into(), i32(), f64()]);
    assert_eq!(wider.outputs(), &[i32(), f64()]);
    assert_eq!(wider.cconv(), CallingConvention::FastC);
    assert!(wider.is_variadic());

    let narrower = func
        .type_without_args_and_results(&bits(&[0]), &bits(&[0]))
        .unwrap();
    assert_eq!(narrower.inputs(), &[f64()]);
    assert!(narrower.outputs().is_empty());
    assert_eq!(narrower.cconv(), CallingConvention::FastC);

    assert!(func
        .type_without_args_and_results(&bits(&[2]), &BitSet::new())
        .unwrap_err()
        .is_index_out_of_range());
    assert_eq!(func.function_type(), &ty);
}

#[test]
fn edits_keep_the_signature_shape() {
    let ty = FunctionType::new([PtrType.into()], [])
        .with_cconv(CallingConvention::TailC)
        .with_variadic(true);
    let mut func = ExternFunc::new("printf", ty);

    func.insert_result(0, i32(), AttrDict::new()).unwrap();
    func.erase_argument(0).unwrap();
    assert_eq!(func.function_type().cconv(), CallingConvention::TailC);
    assert!(func.function_type().is_variadic());
    assert_eq!(func.function_type().to_string(), "(...) -> i32");
}

#[test]
fn out_of_range_attribute_writes_are_rejected() {
    let mut func = Func::new("bounds", FunctionType::new([i32()], [i32()]));
    let err = func.set_arg_attr(5, "llvm.noalias", Attribute::Unit).unwrap_err();
    assert_eq!(
        err,
        Error::IndexOutOfRange {
            function: "bounds".to_string(),
            slot: SignatureSlot::Argument,
            index: 5,
            count: 1,
        }
    );
    assert!(func
        .set_result_attr_dict(1, dict("llvm.noundef", Attribute::Unit))
        .unwrap_err()
        .is_index_out_of_range());
    assert!(func.remove_arg_attr(1, "llvm.noalias").unwrap_err().is_index_out_of_range());
    assert!(func.arg_attr_dicts().is_empty());
    assert!(func.result_attr_dicts().is_empty());
}

#[test]
fn attribute_follows_its_result() {
    let mut func = Func::new("results", FunctionType::new([], [i32(), f64(), PtrType.into()]));
    func.set_result_attr(1, "llvm.noundef", Attribute::Unit).unwrap();
    func.set_result_attr(2, "llvm.nonnull", Attribute::Unit).unwrap();

    func.erase_result(0).unwrap();
    assert_eq!(func.result_types(), &[f64(), PtrType.into()]);
    assert_eq!(func.result_attr(0, "llvm.noundef").unwrap(), Some(&Attribute::Unit));
    assert_eq!(func.result_attr(1, "llvm.nonnull").unwrap(), Some(&Attribute::Unit));
    assert_eq!(func.result_attr_dicts().len(), 2);

    // Erasing every result carrying attributes drops the sequence
    func.erase_results(&bits(&[0, 1])).unwrap();
    assert_eq!(func.num_results(), 0);
    assert!(func.result_attr_dicts().is_empty());
}
